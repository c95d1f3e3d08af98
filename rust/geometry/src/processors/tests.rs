// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tests for face processors.

use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use stp_lite_core::EntityKind;

use super::*;
use crate::entities::{BoundDef, CurveDef, EdgeDef, FaceDef, LoopDef, SurfaceDef, VertexRef};
use crate::error::Error;
use crate::mesh::MeshBuffers;
use crate::router::{FaceProcessor, FaceRouter, Winding};
use crate::transform::Frame;

fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
    Point3::new(x, y, z)
}

fn vertex(index: Option<u32>, point: Point3<f64>) -> VertexRef {
    VertexRef {
        vertex: 0,
        index,
        point,
    }
}

fn line(start: VertexRef, end: VertexRef) -> EdgeDef {
    EdgeDef {
        edge: 0,
        start,
        end,
        curve: CurveDef::Line {
            origin: start.point,
            direction: end.point - start.point,
        },
        seam: false,
        forward: true,
    }
}

fn seam(start: Point3<f64>, end: Point3<f64>) -> EdgeDef {
    EdgeDef {
        seam: true,
        ..line(vertex(None, start), vertex(None, end))
    }
}

/// Arc on a circle about `frame`, walked counter clockwise when `forward`
fn arc(frame: Frame, radius: f64, start: Point3<f64>, end: Point3<f64>, forward: bool) -> EdgeDef {
    EdgeDef {
        edge: 0,
        start: vertex(None, start),
        end: vertex(None, end),
        curve: CurveDef::Circle { frame, radius },
        seam: false,
        forward,
    }
}

fn circle(center: Point3<f64>, radius: f64) -> EdgeDef {
    let frame = Frame::new(center, Vector3::z(), Vector3::x());
    let start = frame.point_at(radius, 0.0, 0.0);
    arc(frame, radius, start, start, true)
}

fn bound(id: u32, edges: Vec<EdgeDef>) -> BoundDef {
    BoundDef {
        id,
        outer: id == 1,
        orientation: true,
        boundary: LoopDef::Edges(edges),
    }
}

fn face(surface: SurfaceDef, bounds: Vec<BoundDef>) -> FaceDef {
    FaceDef {
        id: 100,
        surface_id: 200,
        surface,
        bounds: bounds.into_iter().collect(),
        same_sense: true,
        seams: Vec::new(),
    }
}

fn plane() -> SurfaceDef {
    SurfaceDef::Plane {
        frame: Frame::world(),
    }
}

fn cylinder() -> SurfaceDef {
    SurfaceDef::Cylinder {
        frame: Frame::world(),
        radius: 1.0,
    }
}

fn unit_square() -> Vec<EdgeDef> {
    let corners: Vec<VertexRef> = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)]
        .into_iter()
        .enumerate()
        .map(|(i, point)| vertex(Some(i as u32), point))
        .collect();
    // Shuffled, with one edge stored backwards
    vec![
        line(corners[0], corners[1]),
        line(corners[3], corners[2]),
        line(corners[3], corners[0]),
        line(corners[1], corners[2]),
    ]
}

fn assert_on_cylinder(mesh: &MeshBuffers, radius: f64) {
    for v in &mesh.vertices {
        assert_relative_eq!((v.x * v.x + v.y * v.y).sqrt(), radius, epsilon = 1e-9);
    }
}

// ============================================================================
// Plane
// ============================================================================

#[test]
fn test_plane_straight_polygon_uses_vertex_indices() {
    let mut mesh = MeshBuffers::new();
    PlaneProcessor::new()
        .process(&face(plane(), vec![bound(1, unit_square())]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.faces, vec![vec![0, 1, 2, 3]]);
    assert!(mesh.vertices.is_empty());
}

#[test]
fn test_plane_bound_orientation_reverses_polygon() {
    let mut outer = bound(1, unit_square());
    outer.orientation = false;
    let mut mesh = MeshBuffers::new();
    PlaneProcessor::new()
        .process(&face(plane(), vec![outer]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.faces, vec![vec![3, 2, 1, 0]]);
}

#[test]
fn test_plane_inner_straight_bound_is_dropped() {
    let hole: Vec<EdgeDef> = unit_square()
        .into_iter()
        .map(|mut e| {
            e.start.index = e.start.index.map(|i| i + 4);
            e.end.index = e.end.index.map(|i| i + 4);
            e
        })
        .collect();
    let mut mesh = MeshBuffers::new();
    PlaneProcessor::new()
        .process(&face(plane(), vec![bound(1, unit_square()), bound(2, hole)]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.face_count(), 1);
}

#[test]
fn test_plane_unindexed_vertex_is_an_error() {
    let mut edges = unit_square();
    edges[0].start.index = None;
    let mut mesh = MeshBuffers::new();
    let err = PlaneProcessor::new()
        .process(&face(plane(), vec![bound(1, edges)]), &mut mesh)
        .unwrap_err();

    assert!(matches!(err, Error::InvalidGeometry(_)));
    assert!(mesh.faces.is_empty());
}

#[test]
fn test_plane_open_loop_is_a_loop_integrity_error() {
    let mut edges = unit_square();
    edges.pop();
    let mut mesh = MeshBuffers::new();
    let err = PlaneProcessor::new()
        .process(&face(plane(), vec![bound(1, edges)]), &mut mesh)
        .unwrap_err();

    assert!(matches!(err, Error::LoopIntegrity(_)));
}

#[test]
fn test_plane_circular_disk() {
    let mut mesh = MeshBuffers::new();
    PlaneProcessor::new()
        .process(&face(plane(), vec![bound(1, vec![circle(p(0.0, 0.0, 0.0), 2.0)])]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 32);
    assert_eq!(mesh.faces.len(), 1);
    assert_eq!(mesh.faces[0].len(), 32);
    for v in &mesh.vertices {
        assert_relative_eq!(v.coords.norm(), 2.0, epsilon = 1e-9);
    }
}

#[test]
fn test_plane_annulus() {
    let bounds = vec![
        bound(1, vec![circle(p(0.0, 0.0, 0.0), 2.0)]),
        bound(2, vec![circle(p(0.0, 0.0, 0.0), 1.0)]),
    ];
    let mut mesh = MeshBuffers::new();
    PlaneProcessor::new()
        .process(&face(plane(), bounds), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.face_count(), 32);
    assert!(mesh.faces.iter().all(|f| f.len() == 4));
    assert_relative_eq!(mesh.vertices[0].x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.vertices[32].x, 1.0, epsilon = 1e-9);
}

#[test]
fn test_plane_mixed_bound_becomes_polygon() {
    let frame = Frame::world();
    let a = p(1.0, 0.0, 0.0);
    let b = p(-1.0, 0.0, 0.0);
    let edges = vec![
        arc(frame, 1.0, a, b, true),
        line(vertex(None, b), vertex(None, a)),
    ];
    let mut mesh = MeshBuffers::new();
    PlaneProcessor::new()
        .process(&face(plane(), vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    // 16 arc steps plus the closing corner
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.faces[0].len(), 17);
    assert!(mesh.vertices.iter().all(|v| v.y >= -1e-9));
}

// ============================================================================
// Cylinder
// ============================================================================

#[test]
fn test_cylinder_loop_seam_is_revolved() {
    let bottom = circle(p(0.0, 0.0, 0.0), 1.0);
    let top = circle(p(0.0, 0.0, 2.0), 1.0);
    let edges = vec![
        bottom,
        seam(p(1.0, 0.0, 0.0), p(1.0, 0.0, 2.0)),
        top,
        seam(p(1.0, 0.0, 2.0), p(1.0, 0.0, 0.0)),
    ];
    let mut mesh = MeshBuffers::new();
    CylinderProcessor::new()
        .process(&face(cylinder(), vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.face_count(), 32);
    assert_on_cylinder(&mesh, 1.0);
    // Last quad wraps to the first profile copy
    assert_eq!(mesh.faces[31], vec![62, 63, 1, 0]);
}

#[test]
fn test_cylinder_arc_and_line_are_extruded() {
    let frame = Frame::world();
    let top = Frame::new(p(0.0, 0.0, 2.0), Vector3::z(), Vector3::x());
    let edges = vec![
        arc(frame, 1.0, p(1.0, 0.0, 0.0), p(-1.0, 0.0, 0.0), true),
        line(vertex(None, p(-1.0, 0.0, 0.0)), vertex(None, p(-1.0, 0.0, 2.0))),
        arc(top, 1.0, p(-1.0, 0.0, 2.0), p(1.0, 0.0, 2.0), false),
        line(vertex(None, p(1.0, 0.0, 2.0)), vertex(None, p(1.0, 0.0, 0.0))),
    ];
    let mut mesh = MeshBuffers::new();
    CylinderProcessor::new()
        .process(&face(cylinder(), vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 34);
    assert_eq!(mesh.face_count(), 16);
    assert_on_cylinder(&mesh, 1.0);
    assert_relative_eq!(mesh.vertices[17].z, 2.0, epsilon = 1e-9);
}

#[test]
fn test_cylinder_coaxial_circles_are_bridged() {
    let bounds = vec![
        bound(1, vec![circle(p(0.0, 0.0, 0.0), 1.0)]),
        bound(2, vec![circle(p(0.0, 0.0, 3.0), 1.0)]),
    ];
    let mut mesh = MeshBuffers::new();
    CylinderProcessor::new()
        .process(&face(cylinder(), bounds), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.face_count(), 32);
    assert_on_cylinder(&mesh, 1.0);
    assert_relative_eq!(mesh.vertices[1].z, 0.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.vertices[33].z, 3.0, epsilon = 1e-9);
}

#[test]
fn test_cylinder_associated_seam_wins_over_bridging() {
    let bounds = vec![
        bound(1, vec![circle(p(0.0, 0.0, 0.0), 1.0)]),
        bound(2, vec![circle(p(0.0, 0.0, 3.0), 1.0)]),
    ];
    let mut cylinder_face = face(cylinder(), bounds);
    cylinder_face.seams = vec![seam(p(1.0, 0.0, 0.0), p(1.0, 0.0, 3.0))];

    let mut mesh = MeshBuffers::new();
    CylinderProcessor::new()
        .process(&cylinder_face, &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.face_count(), 32);
    // Revolved seam copies alternate bottom and top
    assert_relative_eq!(mesh.vertices[1].z, 3.0, epsilon = 1e-9);
}

#[test]
fn test_cylinder_single_circle_is_unsupported() {
    let mut mesh = MeshBuffers::new();
    let err = CylinderProcessor::new()
        .process(
            &face(cylinder(), vec![bound(1, vec![circle(p(0.0, 0.0, 0.0), 1.0)])]),
            &mut mesh,
        )
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedSurface(_)));
}

// ============================================================================
// Sphere
// ============================================================================

#[test]
fn test_sphere_is_tessellated_once_per_surface() {
    let sphere = SurfaceDef::Sphere {
        frame: Frame::new(p(1.0, 2.0, 3.0), Vector3::z(), Vector3::x()),
        radius: 2.0,
    };
    let apex = BoundDef {
        id: 1,
        outer: true,
        orientation: true,
        boundary: LoopDef::Vertex(vertex(None, p(1.0, 2.0, 5.0))),
    };
    let sphere_face = face(sphere, vec![apex]);

    let mut mesh = MeshBuffers::new();
    let processor = SphereProcessor::new();
    processor.process(&sphere_face, &mut mesh).unwrap();

    assert_eq!(mesh.vertex_count(), 482);
    assert_eq!(mesh.face_count(), 512);
    for v in &mesh.vertices {
        assert_relative_eq!((v - p(1.0, 2.0, 3.0)).norm(), 2.0, epsilon = 1e-9);
    }

    // A second face on the same surface adds nothing
    processor.process(&sphere_face, &mut mesh).unwrap();
    assert_eq!(mesh.vertex_count(), 482);
    assert_eq!(mesh.face_count(), 512);
}

// ============================================================================
// Torus
// ============================================================================

fn torus() -> SurfaceDef {
    SurfaceDef::Torus {
        frame: Frame::world(),
        major_radius: 5.0,
        minor_radius: 1.0,
    }
}

fn on_torus(v: &Point3<f64>) -> f64 {
    let d = (v.x * v.x + v.y * v.y).sqrt() - 5.0;
    (d * d + v.z * v.z).sqrt()
}

#[test]
fn test_torus_all_circles_gives_full_torus() {
    let minor = Frame::new(p(5.0, 0.0, 0.0), -Vector3::y(), Vector3::x());
    let edges = vec![
        arc(minor, 1.0, p(6.0, 0.0, 0.0), p(6.0, 0.0, 0.0), true),
        circle(p(0.0, 0.0, 0.0), 6.0),
    ];
    let mut mesh = MeshBuffers::new();
    TorusProcessor::new()
        .process(&face(torus(), vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 1024);
    assert_eq!(mesh.face_count(), 1024);
    for v in &mesh.vertices {
        assert_relative_eq!(on_torus(v), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_torus_quarter_patch_sweeps_minor_arc() {
    let world = Frame::world();
    let start_minor = Frame::new(p(5.0, 0.0, 0.0), -Vector3::y(), Vector3::x());
    let end_minor = Frame::new(p(0.0, 5.0, 0.0), -Vector3::x(), -Vector3::y());
    let edges = vec![
        arc(start_minor, 1.0, p(6.0, 0.0, 0.0), p(4.0, 0.0, 0.0), true),
        arc(world, 4.0, p(4.0, 0.0, 0.0), p(0.0, 4.0, 0.0), true),
        arc(end_minor, 1.0, p(0.0, 4.0, 0.0), p(0.0, 6.0, 0.0), true),
        arc(world, 6.0, p(0.0, 6.0, 0.0), p(6.0, 0.0, 0.0), false),
    ];
    let mut mesh = MeshBuffers::new();
    TorusProcessor::new()
        .process(&face(torus(), vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    // 9 copies of a 17 point half circle, 8 by 16 quads
    assert_eq!(mesh.vertex_count(), 153);
    assert_eq!(mesh.face_count(), 128);
    for v in &mesh.vertices {
        assert_relative_eq!(on_torus(v), 1.0, epsilon = 1e-9);
    }
    let last_copy = mesh.vertices[8 * 17];
    assert_relative_eq!(last_copy.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(last_copy.y, 6.0, epsilon = 1e-9);
}

#[test]
fn test_torus_without_minor_arc_is_unsupported() {
    let edges = vec![
        arc(Frame::world(), 6.0, p(6.0, 0.0, 0.0), p(0.0, 6.0, 0.0), true),
        line(vertex(None, p(0.0, 6.0, 0.0)), vertex(None, p(6.0, 0.0, 0.0))),
    ];
    let mut mesh = MeshBuffers::new();
    let err = TorusProcessor::new()
        .process(&face(torus(), vec![bound(1, edges)]), &mut mesh)
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedSurface(_)));
}

// ============================================================================
// Cone and surface of revolution
// ============================================================================

#[test]
fn test_cone_seam_is_revolved() {
    let cone = SurfaceDef::Cone {
        frame: Frame::world(),
        radius: 1.0,
        semi_angle: FRAC_PI_2 / 2.0,
    };
    let edges = vec![
        circle(p(0.0, 0.0, 0.0), 1.0),
        seam(p(1.0, 0.0, 0.0), p(0.0, 0.0, 1.0)),
    ];
    let mut mesh = MeshBuffers::new();
    RevolutionProcessor::new()
        .process(&face(cone, vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.face_count(), 32);
    for apex in mesh.vertices.iter().skip(1).step_by(2) {
        assert_relative_eq!(apex.coords.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(apex.z, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_revolution_profile_swept_backwards() {
    let revolution = SurfaceDef::Revolution {
        frame: Frame::world(),
    };
    let top = Frame::new(p(0.0, 0.0, 1.0), Vector3::z(), Vector3::x());
    let edges = vec![
        arc(Frame::world(), 2.0, p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0), true),
        line(vertex(None, p(0.0, 2.0, 0.0)), vertex(None, p(0.0, 2.0, 1.0))),
        arc(top, 2.0, p(0.0, 2.0, 1.0), p(2.0, 0.0, 1.0), false),
        line(vertex(None, p(2.0, 0.0, 1.0)), vertex(None, p(2.0, 0.0, 0.0))),
    ];
    let mut mesh = MeshBuffers::new();
    RevolutionProcessor::new()
        .process(&face(revolution, vec![bound(1, edges)]), &mut mesh)
        .unwrap();

    assert_eq!(mesh.vertex_count(), 18);
    assert_eq!(mesh.face_count(), 8);
    // The profile at (0, 2) ends up at (2, 0) after a quarter turn back
    let end = mesh.vertices[16];
    assert_relative_eq!(end.x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(end.y, 0.0, epsilon = 1e-9);
}

// ============================================================================
// Router
// ============================================================================

#[test]
fn test_router_keeps_loop_winding_with_opposite_sense() {
    // Plane axis points into the solid, but the loop already follows the face
    let mut flipped = face(plane(), vec![bound(1, unit_square())]);
    flipped.same_sense = false;

    let mut mesh = MeshBuffers::new();
    let added = FaceRouter::new().process(&flipped, &mut mesh).unwrap();

    assert_eq!(added, 1);
    assert_eq!(mesh.faces, vec![vec![0, 1, 2, 3]]);
}

#[test]
fn test_router_reverses_surface_faces_with_opposite_sense() {
    let bounds = || {
        vec![
            bound(1, vec![circle(p(0.0, 0.0, 0.0), 2.0)]),
            bound(2, vec![circle(p(0.0, 0.0, 0.0), 1.0)]),
        ]
    };
    let router = FaceRouter::new();

    let mut forward = MeshBuffers::new();
    router.process(&face(plane(), bounds()), &mut forward).unwrap();

    let mut flipped_face = face(plane(), bounds());
    flipped_face.same_sense = false;
    let mut flipped = MeshBuffers::new();
    router.process(&flipped_face, &mut flipped).unwrap();

    assert_eq!(flipped.face_count(), 32);
    for (a, b) in forward.faces.iter().zip(&flipped.faces) {
        let mut reversed = a.clone();
        reversed.reverse();
        assert_eq!(&reversed, b);
    }
}

#[test]
fn test_processors_report_winding_source() {
    let mut mesh = MeshBuffers::new();
    let square = face(plane(), vec![bound(1, unit_square())]);
    assert_eq!(PlaneProcessor::new().process(&square, &mut mesh).unwrap(), Winding::Loop);

    let sphere_face = face(
        SurfaceDef::Sphere {
            frame: Frame::world(),
            radius: 1.0,
        },
        Vec::new(),
    );
    assert_eq!(
        SphereProcessor::new().process(&sphere_face, &mut mesh).unwrap(),
        Winding::Surface
    );
}

#[test]
fn test_router_without_processor() {
    let router = FaceRouter::empty();
    assert!(!router.supports(EntityKind::Plane));

    let mut mesh = MeshBuffers::new();
    let err = router
        .process(&face(plane(), vec![bound(1, unit_square())]), &mut mesh)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedSurface(_)));
}

#[test]
fn test_default_router_covers_all_surfaces() {
    let router = FaceRouter::new();
    for kind in [
        EntityKind::Plane,
        EntityKind::CylindricalSurface,
        EntityKind::ConicalSurface,
        EntityKind::SphericalSurface,
        EntityKind::ToroidalSurface,
        EntityKind::SurfaceOfRevolution,
    ] {
        assert!(router.supports(kind), "{:?}", kind);
    }
}

#[test]
fn test_revolve_profile_half_turn() {
    let mut mesh = MeshBuffers::new();
    let added = revolve_profile(
        &mut mesh,
        &[p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(2.0, 0.0, 1.0)],
        &Point3::origin(),
        &Vector3::z(),
        std::f64::consts::PI,
    );
    assert_eq!(added, 32);
    assert_eq!(mesh.vertex_count(), 17 * 3);
}

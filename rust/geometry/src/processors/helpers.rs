// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared building blocks used by multiple face processors

use std::f64::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

use crate::entities::{BoundDef, EdgeDef, FaceDef};
use crate::error::{Error, Result};
use crate::mesh::MeshBuffers;
use crate::segment::{dedupe, merge_adjacent, order_segments, Segment, SegmentKind};
use crate::transform::{
    accumulated_angle, points_coincide, rotate_about, steps_for, tessellate_circle, Frame,
    EPSILON, SUBDIVISIONS,
};

/// Classify, merge and order the segments of one bound
pub fn bound_segments(bound: &BoundDef) -> Result<Vec<Segment>> {
    let segments = bound
        .edges()
        .iter()
        .map(Segment::from_edge)
        .collect::<Result<Vec<_>>>()?;
    order_segments(merge_adjacent(segments))
}

/// Segments of every bound of a face, duplicates removed
pub fn face_segments(face: &FaceDef) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for bound in &face.bounds {
        segments.extend(bound_segments(bound)?);
    }
    Ok(dedupe(segments))
}

/// Whether a point is one of a segment's endpoints
#[inline]
pub fn touches(point: &Point3<f64>, segment: &Segment) -> bool {
    points_coincide(point, &segment.first()) || points_coincide(point, &segment.last())
}

/// Rotate a profile chain about an axis and connect the copies with quads
///
/// A full turn wraps around to the first copy instead of repeating it.
/// Returns the number of faces added.
pub fn revolve_profile(
    mesh: &mut MeshBuffers,
    profile: &[Point3<f64>],
    origin: &Point3<f64>,
    axis: &Vector3<f64>,
    span: f64,
) -> usize {
    let n = profile.len();
    if n < 2 {
        return 0;
    }

    let steps = steps_for(span);
    let closed = (span.abs() - TAU).abs() < EPSILON;
    let copies = if closed { steps } else { steps + 1 };

    let base = mesh.vertex_count() as u32;
    for k in 0..copies {
        let angle = span * k as f64 / steps as f64;
        for point in profile {
            mesh.push_vertex(rotate_about(point, origin, axis, angle));
        }
    }

    for k in 0..steps {
        let next = if closed { (k + 1) % steps } else { k + 1 };
        for j in 0..n - 1 {
            let a = base + (k * n + j) as u32;
            let b = base + (next * n + j) as u32;
            mesh.push_face(vec![a, a + 1, b + 1, b]);
        }
    }
    steps * (n - 1)
}

/// Revolve a seam edge a full turn about a frame's axis
pub fn revolve_seam(mesh: &mut MeshBuffers, frame: &Frame, seam: &EdgeDef) -> Result<()> {
    let profile = Segment::from_edge(seam)?;
    revolve_profile(mesh, &profile.vertices, &frame.origin, &frame.z, TAU);
    Ok(())
}

/// Sweep a profile segment about a frame's axis through the span of the
/// sweep arc that starts or ends on it
///
/// Sweep arcs are curved segments centered on the axis. A closed sweep
/// means a full turn.
pub fn sweep_profile<F>(
    mesh: &mut MeshBuffers,
    frame: &Frame,
    segments: &[Segment],
    is_profile: F,
) -> Result<()>
where
    F: Fn(&Segment) -> bool,
{
    let profile = segments
        .iter()
        .find(|s| is_profile(s))
        .ok_or_else(|| Error::unsupported("no profile segment in face bounds"))?;

    let sweeps: Vec<&Segment> = segments
        .iter()
        .filter(|s| s.is_curved() && s.is_centered_on(frame) && !std::ptr::eq(*s, profile))
        .collect();

    let mut span = None;
    for sweep in &sweeps {
        if sweep.is_closed() {
            if touches(&sweep.first(), profile) {
                span = Some(TAU);
                break;
            }
            continue;
        }
        let center = sweep.center.unwrap_or(frame.origin);
        if touches(&sweep.first(), profile) {
            span = Some(accumulated_angle(&sweep.vertices, &center, &frame.z));
            break;
        }
        if touches(&sweep.last(), profile) {
            span = Some(-accumulated_angle(&sweep.vertices, &center, &frame.z));
            break;
        }
    }

    let span = span.ok_or_else(|| Error::unsupported("no sweep arc touches the profile"))?;
    revolve_profile(mesh, &profile.vertices, &frame.origin, &frame.z, span);
    Ok(())
}

/// Connect two closed rings of equal length with quads
pub fn bridge_rings(mesh: &mut MeshBuffers, a: &[Point3<f64>], b: &[Point3<f64>]) -> Result<()> {
    if a.len() != b.len() || a.len() < 3 {
        return Err(Error::geometry(format!(
            "cannot bridge rings of {} and {} points",
            a.len(),
            b.len()
        )));
    }

    let n = a.len() as u32;
    let base_a = mesh.push_vertices(a);
    let base_b = mesh.push_vertices(b);
    for j in 0..n {
        let k = (j + 1) % n;
        mesh.push_face(vec![base_a + j, base_a + k, base_b + k, base_b + j]);
    }
    Ok(())
}

/// Bridge two circles centered on a frame's axis, phase-aligned to the frame
pub fn bridge_circles(
    mesh: &mut MeshBuffers,
    frame: &Frame,
    first: &Segment,
    second: &Segment,
) -> Result<()> {
    let ring = |circle: &Segment| -> Result<Vec<Point3<f64>>> {
        match (circle.center, circle.radius) {
            (Some(center), Some(radius)) => Ok(tessellate_circle(&frame.moved_to(center), radius)),
            _ => Err(Error::geometry("circle segment without center")),
        }
    };
    bridge_rings(mesh, &ring(first)?, &ring(second)?)
}

/// Translate a chain along a vector and connect both copies with quads
pub fn extrude_chain(mesh: &mut MeshBuffers, chain: &[Point3<f64>], direction: &Vector3<f64>) {
    let n = chain.len() as u32;
    if n < 2 {
        return;
    }
    let base = mesh.push_vertices(chain);
    let moved: Vec<Point3<f64>> = chain.iter().map(|p| p + direction).collect();
    let top = mesh.push_vertices(&moved);
    for j in 0..n - 1 {
        mesh.push_face(vec![base + j, base + j + 1, top + j + 1, top + j]);
    }
}

/// First open arc together with the vector of a line leaving one of its ends
pub fn arc_and_line(segments: &[Segment]) -> Option<(&Segment, Vector3<f64>)> {
    let arc = segments.iter().find(|s| s.kind == SegmentKind::Arc)?;
    segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Line)
        .find_map(|line| {
            if touches(&line.first(), arc) {
                Some((arc, line.direction()))
            } else if touches(&line.last(), arc) {
                Some((arc, -line.direction()))
            } else {
                None
            }
        })
}

/// Latitude/longitude sphere: two poles and `SUBDIVISIONS / 2 - 1` rings
pub fn tessellate_sphere(mesh: &mut MeshBuffers, frame: &Frame, radius: f64) {
    let rings = SUBDIVISIONS / 2;
    let n = SUBDIVISIONS as u32;

    let north = mesh.push_vertex(frame.point_at(0.0, 0.0, radius));
    for k in 1..rings {
        let phi = PI * k as f64 / rings as f64;
        for j in 0..SUBDIVISIONS {
            let theta = TAU * j as f64 / SUBDIVISIONS as f64;
            mesh.push_vertex(frame.point_at(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }
    let south = mesh.push_vertex(frame.point_at(0.0, 0.0, -radius));

    let ring = |k: usize| north + 1 + (k as u32 - 1) * n;

    for j in 0..n {
        let next = (j + 1) % n;
        mesh.push_face(vec![north, ring(1) + j, ring(1) + next]);
    }
    for k in 1..rings - 1 {
        let (upper, lower) = (ring(k), ring(k + 1));
        for j in 0..n {
            let next = (j + 1) % n;
            mesh.push_face(vec![upper + j, lower + j, lower + next, upper + next]);
        }
    }
    let last = ring(rings - 1);
    for j in 0..n {
        let next = (j + 1) % n;
        mesh.push_face(vec![last + j, south, last + next]);
    }
}

/// Full torus grid of `SUBDIVISIONS` by `SUBDIVISIONS` quads
pub fn tessellate_torus(mesh: &mut MeshBuffers, frame: &Frame, major_radius: f64, minor_radius: f64) {
    let n = SUBDIVISIONS as u32;
    let base = mesh.vertex_count() as u32;

    for i in 0..SUBDIVISIONS {
        let theta = TAU * i as f64 / SUBDIVISIONS as f64;
        for j in 0..SUBDIVISIONS {
            let phi = TAU * j as f64 / SUBDIVISIONS as f64;
            let distance = major_radius + minor_radius * phi.cos();
            mesh.push_vertex(frame.point_at(
                distance * theta.cos(),
                distance * theta.sin(),
                minor_radius * phi.sin(),
            ));
        }
    }

    for i in 0..n {
        let next_i = (i + 1) % n;
        for j in 0..n {
            let next_j = (j + 1) % n;
            mesh.push_face(vec![
                base + i * n + j,
                base + next_i * n + j,
                base + next_i * n + next_j,
                base + i * n + next_j,
            ]);
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane processor - planar polygons, disks and annuli.

use stp_lite_core::EntityKind;

use crate::entities::{BoundDef, EdgeDef, FaceDef};
use crate::error::{Error, Result};
use crate::loops::walk_edge_loop;
use crate::mesh::MeshBuffers;
use crate::router::{FaceProcessor, Winding};
use crate::segment::{flatten, Segment};
use crate::transform::{points_coincide, tessellate_circle, Frame, EPSILON};

use super::helpers::{bound_segments, bridge_rings, face_segments};

/// Plane processor
/// Straight-edged bounds become one polygon over the shared vertices.
/// Circular bounds are tessellated into new vertices.
pub struct PlaneProcessor;

impl PlaneProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Polygon over the vertex indices stamped by the vertex hook
    fn straight_polygon(face: &FaceDef, bound: &BoundDef, mesh: &mut MeshBuffers) -> Result<()> {
        let pairs = bound
            .edges()
            .iter()
            .map(|edge| match (edge.start.index, edge.end.index) {
                (Some(a), Some(b)) => Ok((a, b)),
                _ => Err(Error::geometry(format!(
                    "edge #{} has an unindexed vertex",
                    edge.edge
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut polygon = walk_edge_loop(&pairs)?;
        if !bound.orientation {
            polygon.reverse();
        }
        mesh.push_face(polygon);

        for hole in face.bounds.iter().filter(|b| b.id != bound.id) {
            tracing::debug!(face = face.id, bound = hole.id, "dropping inner bound of planar face");
        }
        Ok(())
    }

    fn disk(circle: &Segment, bound: &BoundDef, mesh: &mut MeshBuffers) {
        let mut points = flatten(std::slice::from_ref(circle));
        if !bound.orientation {
            points.reverse();
        }
        mesh.push_polygon(&points);
    }

    /// Ring of quads between two concentric circles, aligned to the plane's X axis
    fn annulus(frame: &Frame, outer: &Segment, inner: &Segment, mesh: &mut MeshBuffers) -> Result<()> {
        let (Some(center), Some(r_outer), Some(r_inner)) = (outer.center, outer.radius, inner.radius)
        else {
            return Err(Error::geometry("annulus circle without center"));
        };
        let ring_frame = Frame::new(center, frame.z, frame.x);
        bridge_rings(
            mesh,
            &tessellate_circle(&ring_frame, r_outer),
            &tessellate_circle(&ring_frame, r_inner),
        )
    }
}

fn concentric(a: &Segment, b: &Segment) -> bool {
    match ((a.center, a.normal), (b.center, b.normal)) {
        ((Some(c1), Some(n1)), (Some(c2), Some(n2))) => {
            points_coincide(&c1, &c2) && n1.dot(&n2).abs() > 1.0 - EPSILON
        }
        _ => false,
    }
}

impl FaceProcessor for PlaneProcessor {
    fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<Winding> {
        let bound = face
            .authoritative_bound()
            .ok_or_else(|| Error::missing(face.id, "bounds"))?;

        let edges = bound.edges();
        if !edges.is_empty() && edges.iter().all(EdgeDef::is_line) {
            Self::straight_polygon(face, bound, mesh)?;
            return Ok(Winding::Loop);
        }

        let segments = face_segments(face)?;
        if !segments.is_empty() && segments.iter().all(Segment::is_closed) {
            return match segments.as_slice() {
                [circle] => {
                    Self::disk(circle, bound, mesh);
                    Ok(Winding::Loop)
                }
                [a, b] if concentric(a, b) => {
                    let (outer, inner) = if a.radius >= b.radius { (a, b) } else { (b, a) };
                    Self::annulus(face.surface.frame(), outer, inner, mesh)?;
                    Ok(Winding::Surface)
                }
                _ => {
                    let own = bound_segments(bound)?;
                    let circle = own
                        .first()
                        .ok_or_else(|| Error::geometry("planar bound without segments"))?;
                    tracing::debug!(
                        face = face.id,
                        circles = segments.len(),
                        "keeping only the outer circle of planar face"
                    );
                    Self::disk(circle, bound, mesh);
                    Ok(Winding::Loop)
                }
            };
        }

        // Mixed lines and arcs: one polygon of new vertices, holes dropped
        let ordered = bound_segments(bound)?;
        let mut points = flatten(&ordered);
        if points.len() < 3 {
            return Err(Error::geometry(format!(
                "planar bound #{} has {} points",
                bound.id,
                points.len()
            )));
        }
        if !bound.orientation {
            points.reverse();
        }
        mesh.push_polygon(&points);
        Ok(Winding::Loop)
    }

    fn supported_surfaces(&self) -> Vec<EntityKind> {
        vec![EntityKind::Plane]
    }
}

impl Default for PlaneProcessor {
    fn default() -> Self {
        Self::new()
    }
}

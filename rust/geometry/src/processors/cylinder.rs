// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CylindricalSurface processor.

use stp_lite_core::EntityKind;

use crate::entities::{FaceDef, SurfaceDef};
use crate::error::{Error, Result};
use crate::mesh::MeshBuffers;
use crate::router::{FaceProcessor, Winding};
use crate::segment::Segment;

use super::helpers::{arc_and_line, bridge_circles, extrude_chain, face_segments, revolve_seam};

/// Cylinder processor
///
/// Rules, first match wins:
/// 1. a seam line in the face's loops is revolved a full turn
/// 2. an arc with a line leaving one of its ends is extruded along that line
/// 3. a seam associated with the surface is revolved a full turn
/// 4. two circles on the axis are bridged with a ring of quads
pub struct CylinderProcessor;

impl CylinderProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl FaceProcessor for CylinderProcessor {
    fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<Winding> {
        let SurfaceDef::Cylinder { frame, .. } = &face.surface else {
            return Err(Error::unsupported(format!(
                "face #{} is not cylindrical",
                face.id
            )));
        };

        if let Some(seam) = face.loop_seam() {
            revolve_seam(mesh, frame, seam)?;
            return Ok(Winding::Surface);
        }

        let segments = face_segments(face)?;
        if let Some((arc, direction)) = arc_and_line(&segments) {
            extrude_chain(mesh, &arc.vertices, &direction);
            return Ok(Winding::Loop);
        }

        if let Some(seam) = face.associated_seam() {
            revolve_seam(mesh, frame, seam)?;
            return Ok(Winding::Surface);
        }

        let circles: Vec<&Segment> = segments
            .iter()
            .filter(|s| s.is_closed() && s.is_centered_on(frame))
            .collect();
        if let [first, second] = circles.as_slice() {
            bridge_circles(mesh, frame, first, second)?;
            return Ok(Winding::Surface);
        }

        Err(Error::unsupported(format!(
            "cylinder face #{} with {} boundary segments",
            face.id,
            segments.len()
        )))
    }

    fn supported_surfaces(&self) -> Vec<EntityKind> {
        vec![EntityKind::CylindricalSurface]
    }
}

impl Default for CylinderProcessor {
    fn default() -> Self {
        Self::new()
    }
}

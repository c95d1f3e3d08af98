// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ConicalSurface and SurfaceOfRevolution processor - profile sweeps.

use stp_lite_core::EntityKind;

use crate::entities::FaceDef;
use crate::error::Result;
use crate::mesh::MeshBuffers;
use crate::router::{FaceProcessor, Winding};
use crate::segment::Segment;

use super::helpers::{bridge_circles, face_segments, revolve_seam, sweep_profile};

/// Revolution processor
///
/// A seam, in the loops or associated with the surface, is revolved a full
/// turn. A frustum bounded by two axis circles is bridged. Anything else
/// sweeps the first off-axis segment through the span of the axis arc
/// touching it.
pub struct RevolutionProcessor;

impl RevolutionProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl FaceProcessor for RevolutionProcessor {
    fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<Winding> {
        let frame = face.surface.frame();

        if let Some(seam) = face.loop_seam().or_else(|| face.associated_seam()) {
            revolve_seam(mesh, frame, seam)?;
            return Ok(Winding::Surface);
        }

        let segments = face_segments(face)?;
        let circles: Vec<&Segment> = segments
            .iter()
            .filter(|s| s.is_closed() && s.is_centered_on(frame))
            .collect();
        if let [first, second] = circles.as_slice() {
            bridge_circles(mesh, frame, first, second)?;
            return Ok(Winding::Surface);
        }

        sweep_profile(mesh, frame, &segments, |s| !s.is_centered_on(frame))?;
        Ok(Winding::Surface)
    }

    fn supported_surfaces(&self) -> Vec<EntityKind> {
        vec![EntityKind::ConicalSurface, EntityKind::SurfaceOfRevolution]
    }
}

impl Default for RevolutionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

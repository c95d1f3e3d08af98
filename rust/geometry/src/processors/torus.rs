// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ToroidalSurface processor.

use stp_lite_core::EntityKind;

use crate::entities::{FaceDef, SurfaceDef};
use crate::error::{Error, Result};
use crate::mesh::MeshBuffers;
use crate::router::{FaceProcessor, Winding};
use crate::segment::{Segment, SegmentKind};
use crate::transform::EPSILON;

use super::helpers::{face_segments, sweep_profile, tessellate_torus};

/// Torus processor
///
/// Bounds made only of circles give the full torus. Otherwise an arc of
/// the minor radius is swept about the axis through the span of the major
/// arc that starts or ends on it, which covers the usual four-arc patch.
pub struct TorusProcessor;

impl TorusProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl FaceProcessor for TorusProcessor {
    fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<Winding> {
        let SurfaceDef::Torus {
            frame,
            major_radius,
            minor_radius,
        } = &face.surface
        else {
            return Err(Error::unsupported(format!("face #{} is not toroidal", face.id)));
        };

        let segments = face_segments(face)?;
        if !segments.is_empty() && segments.iter().all(Segment::is_closed) {
            tessellate_torus(mesh, frame, *major_radius, *minor_radius);
            return Ok(Winding::Surface);
        }

        let arcs = segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Arc)
            .count();
        if arcs != 4 {
            tracing::debug!(face = face.id, arcs, "torus patch is not bounded by four arcs");
        }

        let minor = *minor_radius;
        sweep_profile(mesh, frame, &segments, |s| {
            s.is_curved()
                && !s.is_centered_on(frame)
                && s.radius.is_some_and(|r| (r - minor).abs() < EPSILON)
        })?;
        Ok(Winding::Surface)
    }

    fn supported_surfaces(&self) -> Vec<EntityKind> {
        vec![EntityKind::ToroidalSurface]
    }
}

impl Default for TorusProcessor {
    fn default() -> Self {
        Self::new()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SphericalSurface processor.

use stp_lite_core::EntityKind;

use crate::entities::{FaceDef, SurfaceDef};
use crate::error::{Error, Result};
use crate::mesh::MeshBuffers;
use crate::router::{FaceProcessor, Winding};

use super::helpers::tessellate_sphere;

/// Sphere processor
/// Emits the whole sphere once per surface and object, whatever the bounds.
pub struct SphereProcessor;

impl SphereProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl FaceProcessor for SphereProcessor {
    fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<Winding> {
        let SurfaceDef::Sphere { frame, radius } = &face.surface else {
            return Err(Error::unsupported(format!("face #{} is not spherical", face.id)));
        };
        if *radius <= 0.0 {
            return Err(Error::geometry(format!("sphere #{} radius {}", face.surface_id, radius)));
        }

        if mesh.mark_surface(face.surface_id) {
            tessellate_sphere(mesh, frame, *radius);
        } else {
            tracing::debug!(face = face.id, surface = face.surface_id, "sphere already tessellated");
        }
        Ok(Winding::Surface)
    }

    fn supported_surfaces(&self) -> Vec<EntityKind> {
        vec![EntityKind::SphericalSurface]
    }
}

impl Default for SphereProcessor {
    fn default() -> Self {
        Self::new()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face Router - Dynamic dispatch to face processors
//!
//! Routes advanced faces to processors based on their surface type.

use std::collections::HashMap;
use std::sync::Arc;

use stp_lite_core::EntityKind;

use crate::entities::FaceDef;
use crate::error::{Error, Result};
use crate::mesh::MeshBuffers;
use crate::processors::{
    CylinderProcessor, PlaneProcessor, RevolutionProcessor, SphereProcessor, TorusProcessor,
};

/// Where the winding of a processor's output comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Polygons follow the face's edge loops, which already agree with the face normal
    Loop,
    /// Polygons follow the surface frame and must be flipped for `same_sense = .F.`
    Surface,
}

/// Face processor trait
/// Each processor handles one or more surface types
pub trait FaceProcessor: Send + Sync {
    /// Append the face's polygons to the object's buffers
    fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<Winding>;

    /// Get supported surface types
    fn supported_surfaces(&self) -> Vec<EntityKind>;
}

/// Face router - routes faces to processors
pub struct FaceRouter {
    processors: HashMap<EntityKind, Arc<dyn FaceProcessor>>,
}

impl FaceRouter {
    /// Create new router with default processors
    pub fn new() -> Self {
        let mut router = Self::empty();
        router.register(Box::new(PlaneProcessor::new()));
        router.register(Box::new(CylinderProcessor::new()));
        router.register(Box::new(SphereProcessor::new()));
        router.register(Box::new(TorusProcessor::new()));
        router.register(Box::new(RevolutionProcessor::new()));
        router
    }

    /// Router without any processors
    pub fn empty() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Register a face processor
    pub fn register(&mut self, processor: Box<dyn FaceProcessor>) {
        let processor_arc: Arc<dyn FaceProcessor> = Arc::from(processor);
        for kind in processor_arc.supported_surfaces() {
            self.processors.insert(kind, Arc::clone(&processor_arc));
        }
    }

    pub fn supports(&self, kind: EntityKind) -> bool {
        self.processors.contains_key(&kind)
    }

    /// Process one face into the mesh buffers
    ///
    /// Faces built from the surface frame get their winding reversed when
    /// `same_sense` is false. Returns the number of faces added.
    pub fn process(&self, face: &FaceDef, mesh: &mut MeshBuffers) -> Result<usize> {
        let kind = face.surface.kind();
        let processor = self.processors.get(&kind).ok_or_else(|| {
            Error::unsupported(format!("no processor for {} on face #{}", kind.as_str(), face.id))
        })?;

        let start = mesh.face_count();
        let winding = processor.process(face, mesh)?;
        if winding == Winding::Surface && !face.same_sense {
            mesh.reverse_faces_from(start);
        }

        let added = mesh.face_count() - start;
        tracing::trace!(face = face.id, surface = kind.as_str(), added, "processed face");
        Ok(added)
    }
}

impl Default for FaceRouter {
    fn default() -> Self {
        Self::new()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::Point3;
use rustc_hash::FxHashSet;
use stp_lite_core::EntityId;

/// Object name used when no PRODUCT names the solid
pub const UNKNOWN_OBJECT: &str = "Unknown Object";

/// Per-object vertex, edge and face accumulators
///
/// Indices are offsets into `vertices` at push time and are never reused
/// within an object.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    pub vertices: Vec<Point3<f64>>,
    pub edges: Vec<[u32; 2]>,
    /// Polygon loops of vertex indices
    pub faces: Vec<Vec<u32>>,
    /// Surfaces tessellated whole for this object, e.g. spheres
    tessellated_surfaces: FxHashSet<EntityId>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its index
    #[inline]
    pub fn push_vertex(&mut self, point: Point3<f64>) -> u32 {
        self.vertices.push(point);
        (self.vertices.len() - 1) as u32
    }

    /// Append points and return the index of the first one
    pub fn push_vertices(&mut self, points: &[Point3<f64>]) -> u32 {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(points);
        base
    }

    /// Append an edge and return its index
    #[inline]
    pub fn push_edge(&mut self, a: u32, b: u32) -> u32 {
        self.edges.push([a, b]);
        (self.edges.len() - 1) as u32
    }

    #[inline]
    pub fn push_face(&mut self, face: Vec<u32>) {
        self.faces.push(face);
    }

    /// Append a polygon of new vertices as one face
    pub fn push_polygon(&mut self, points: &[Point3<f64>]) {
        let base = self.push_vertices(points);
        self.faces.push((base..base + points.len() as u32).collect());
    }

    /// Mark a surface as tessellated. Returns false if it already was.
    pub fn mark_surface(&mut self, surface: EntityId) -> bool {
        self.tessellated_surfaces.insert(surface)
    }

    /// Reverse the winding of every face from `start` on
    pub fn reverse_faces_from(&mut self, start: usize) {
        for face in self.faces.iter_mut().skip(start) {
            face.reverse();
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Clear all buffers for a new object
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.tessellated_surfaces.clear();
    }

    /// Hand the buffers over as a payload and start empty
    pub fn take_payload(&mut self, object_name: impl Into<String>) -> MeshPayload {
        let payload = MeshPayload {
            object_name: object_name.into(),
            vertices: self.vertices.iter().map(|p| [p.x, p.y, p.z]).collect(),
            edges: std::mem::take(&mut self.edges),
            faces: std::mem::take(&mut self.faces),
        };
        self.reset();
        payload
    }
}

/// Finished mesh of one solid, as handed to the host
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeshPayload {
    pub object_name: String,
    pub vertices: Vec<[f64; 3]>,
    pub edges: Vec<[u32; 2]>,
    pub faces: Vec<Vec<u32>>,
}

impl MeshPayload {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

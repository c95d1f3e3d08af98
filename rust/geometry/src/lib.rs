// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STP-Lite Geometry
//!
//! Rebuilds polygon meshes from the analytic B-rep solids of a STEP file,
//! using nalgebra for placements and transformations.
//!
//! Every ADVANCED_BREP_SHAPE_REPRESENTATION becomes one [`MeshPayload`]
//! named after its PRODUCT. Curved surfaces are tessellated with
//! [`SUBDIVISIONS`] steps per full turn.
//!
//! ```rust,ignore
//! use stp_lite_geometry::StepImporter;
//!
//! let report = StepImporter::new().import_file("part.stp")?;
//! for object in &report.objects {
//!     println!("{}: {} faces", object.object_name, object.face_count());
//! }
//! ```

pub mod entities;
pub mod error;
pub mod import;
pub mod loops;
pub mod mesh;
pub mod processors;
pub mod router;
pub mod segment;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use entities::{BoundDef, CurveDef, EdgeDef, FaceDef, LoopDef, SurfaceDef, VertexRef};
pub use error::{Error, Result};
pub use import::{ImportReport, ImportState, StepImporter};
pub use loops::walk_edge_loop;
pub use mesh::{MeshBuffers, MeshPayload, UNKNOWN_OBJECT};
pub use processors::{
    CylinderProcessor, PlaneProcessor, RevolutionProcessor, SphereProcessor, TorusProcessor,
};
pub use router::{FaceProcessor, FaceRouter, Winding};
pub use segment::{Segment, SegmentKind};
pub use transform::{Frame, EPSILON, SUBDIVISIONS};

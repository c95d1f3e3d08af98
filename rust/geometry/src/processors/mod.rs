// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face Processors
//!
//! One processor per surface family:
//!
//! - `plane`: Plane (polygons, disks and annuli)
//! - `cylinder`: CylindricalSurface (seam revolve, arc extrusion, ring bridging)
//! - `sphere`: SphericalSurface (whole-sphere tessellation)
//! - `torus`: ToroidalSurface (full torus or swept minor arc)
//! - `revolution`: ConicalSurface, SurfaceOfRevolution (profile sweeps)
//! - `helpers`: Segment collection and sweep/bridge builders shared by the above

mod helpers;
mod plane;
mod cylinder;
mod sphere;
mod torus;
mod revolution;

#[cfg(test)]
mod tests;

pub use plane::PlaneProcessor;
pub use cylinder::CylinderProcessor;
pub use sphere::SphereProcessor;
pub use torus::TorusProcessor;
pub use revolution::RevolutionProcessor;

pub use helpers::{bound_segments, face_segments, revolve_profile};

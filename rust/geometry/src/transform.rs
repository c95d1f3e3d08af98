// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement frames and fixed-precision tessellation
//!
//! Reads STEP placement and point entities out of the instance graph and
//! provides the circle, arc and rotation primitives every surface processor
//! builds on. All curved primitives use [`SUBDIVISIONS`] steps per full turn.

use std::f64::consts::TAU;

use nalgebra::{Matrix4, Point3, Vector3};
use stp_lite_core::{EntityId, EntityKind, InstanceGraph, ResolvedInstance};

use crate::error::{Error, Result};

/// Steps per full revolution for every curved primitive
pub const SUBDIVISIONS: usize = 32;

/// Distance and angle tolerance for geometric comparisons
pub const EPSILON: f64 = 1e-6;

/// Orthonormal local coordinate frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point3<f64>,
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub z: Vector3<f64>,
}

impl Frame {
    /// Build a frame from an axis and a reference direction
    ///
    /// The reference direction is projected onto the plane perpendicular to
    /// the axis. If they are parallel a default perpendicular is used.
    pub fn new(origin: Point3<f64>, axis: Vector3<f64>, ref_direction: Vector3<f64>) -> Self {
        let z = axis.try_normalize(EPSILON).unwrap_or_else(Vector3::z);
        let x_normalized = ref_direction.try_normalize(EPSILON).unwrap_or_else(Vector3::x);

        // Ensure X is orthogonal to Z
        let x_orthogonal = x_normalized - z * x_normalized.dot(&z);
        let x = if x_orthogonal.norm() > EPSILON {
            x_orthogonal.normalize()
        } else if z.z.abs() < 0.9 {
            Vector3::z().cross(&z).normalize()
        } else {
            Vector3::x().cross(&z).normalize()
        };

        // Right-hand rule: Y = Z x X
        let y = z.cross(&x).normalize();

        Self { origin, x, y, z }
    }

    /// World frame at the origin
    pub fn world() -> Self {
        Self::new(Point3::origin(), Vector3::z(), Vector3::x())
    }

    /// Same axes at another origin
    pub fn moved_to(&self, origin: Point3<f64>) -> Self {
        Self { origin, ..*self }
    }

    /// Local-to-world transform. Columns are the world-space directions of
    /// the local axes followed by the origin.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let mut transform = Matrix4::identity();
        for (col, axis) in [self.x, self.y, self.z].iter().enumerate() {
            transform[(0, col)] = axis.x;
            transform[(1, col)] = axis.y;
            transform[(2, col)] = axis.z;
        }
        transform[(0, 3)] = self.origin.x;
        transform[(1, 3)] = self.origin.y;
        transform[(2, 3)] = self.origin.z;
        transform
    }

    /// World point at local coordinates (u, v, w)
    #[inline]
    pub fn point_at(&self, u: f64, v: f64, w: f64) -> Point3<f64> {
        self.origin + self.x * u + self.y * v + self.z * w
    }

    /// Distance of a point from this frame's Z axis line
    pub fn distance_from_axis(&self, point: &Point3<f64>) -> f64 {
        let offset = point - self.origin;
        (offset - self.z * offset.dot(&self.z)).norm()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::world()
    }
}

/// Number of steps used for an angular span
#[inline]
pub fn steps_for(span: f64) -> usize {
    let steps = (span.abs() * SUBDIVISIONS as f64 / TAU - EPSILON).ceil();
    (steps as usize).max(1)
}

/// Whether two points coincide within [`EPSILON`]
#[inline]
pub fn points_coincide(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a - b).norm() < EPSILON
}

/// Tessellate a full circle in the frame's XY plane
///
/// Returns [`SUBDIVISIONS`] points starting on the frame's X axis, counter
/// clockwise about its Z axis. The first point is not repeated.
pub fn tessellate_circle(frame: &Frame, radius: f64) -> Vec<Point3<f64>> {
    let transform = frame.to_matrix();
    (0..SUBDIVISIONS)
        .map(|i| {
            let theta = TAU * i as f64 / SUBDIVISIONS as f64;
            transform.transform_point(&Point3::new(radius * theta.cos(), radius * theta.sin(), 0.0))
        })
        .collect()
}

/// Angular span of an arc from `start` to `end` about `normal`
///
/// `sign > 0` walks counter clockwise, `sign < 0` clockwise. Coincident
/// endpoints mean a full turn.
pub fn arc_span(
    center: &Point3<f64>,
    normal: &Vector3<f64>,
    start: &Point3<f64>,
    end: &Point3<f64>,
    sign: f64,
) -> f64 {
    let normal = normal.try_normalize(EPSILON).unwrap_or_else(Vector3::z);
    let mut span = signed_angle(&(start - center), &(end - center), &normal);
    if span < 0.0 {
        span += TAU;
    }
    if span < EPSILON || points_coincide(start, end) {
        span = TAU;
    }
    if sign < 0.0 {
        span -= TAU;
        if span.abs() < EPSILON {
            span = -TAU;
        }
    }
    span
}

/// Tessellate an arc from `start` to `end` about `center`
///
/// The returned chain holds both endpoints, snapped to the given points, so
/// a full circle starts and ends on the same point.
pub fn tessellate_arc(
    center: &Point3<f64>,
    normal: &Vector3<f64>,
    radius: f64,
    start: &Point3<f64>,
    end: &Point3<f64>,
    sign: f64,
) -> Vec<Point3<f64>> {
    let normal = normal.try_normalize(EPSILON).unwrap_or_else(Vector3::z);
    let u = (start - center).try_normalize(EPSILON).unwrap_or_else(|| {
        Frame::new(*center, normal, Vector3::x()).x
    });
    let v = normal.cross(&u);

    let span = arc_span(center, &normal, start, end, sign);
    let steps = steps_for(span);

    let mut points = Vec::with_capacity(steps + 1);
    points.push(*start);
    for i in 1..steps {
        let angle = span * i as f64 / steps as f64;
        points.push(center + (u * angle.cos() + v * angle.sin()) * radius);
    }
    points.push(*end);
    points
}

/// Rotate a point about an axis line (Rodrigues' rotation formula)
pub fn rotate_about(
    point: &Point3<f64>,
    origin: &Point3<f64>,
    axis: &Vector3<f64>,
    angle: f64,
) -> Point3<f64> {
    let k = axis.normalize();
    let v = point - origin;
    let (sin_t, cos_t) = angle.sin_cos();
    let rotated = v * cos_t + k.cross(&v) * sin_t + k * k.dot(&v) * (1.0 - cos_t);
    origin + rotated
}

/// Signed angle from `from` to `to`, measured about `axis`, in (-pi, pi]
pub fn signed_angle(from: &Vector3<f64>, to: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    let sin = from.cross(to).dot(axis);
    let cos = from.dot(to);
    sin.atan2(cos)
}

/// Total signed angle swept by a point chain about an axis through `center`
pub fn accumulated_angle(points: &[Point3<f64>], center: &Point3<f64>, axis: &Vector3<f64>) -> f64 {
    let axis = axis.normalize();
    points
        .windows(2)
        .map(|pair| signed_angle(&(pair[0] - center), &(pair[1] - center), &axis))
        .sum()
}

pub(crate) fn instance<'g>(graph: &'g InstanceGraph, id: EntityId) -> Result<&'g ResolvedInstance> {
    graph
        .get(id)
        .filter(|i| i.is_resolved())
        .ok_or_else(|| Error::geometry(format!("#{} is not resolved", id)))
}

pub(crate) fn expect_kind(instance: &ResolvedInstance, kind: EntityKind) -> Result<()> {
    if instance.is_kind(kind) {
        Ok(())
    } else {
        Err(Error::geometry(format!(
            "expected {} at #{}, found {}",
            kind, instance.id, instance.type_name
        )))
    }
}

/// Parse CARTESIAN_POINT
///
/// Missing trailing coordinates default to zero.
pub fn parse_cartesian_point(graph: &InstanceGraph, id: EntityId) -> Result<Point3<f64>> {
    let point = instance(graph, id)?;
    expect_kind(point, EntityKind::CartesianPoint)?;

    let coords = point
        .get("coordinates")
        .map(|v| v.floats())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::missing(id, "coordinates"))?;

    Ok(Point3::new(
        coords[0],
        coords.get(1).copied().unwrap_or(0.0),
        coords.get(2).copied().unwrap_or(0.0),
    ))
}

/// Parse DIRECTION into a unit vector
pub fn parse_direction(graph: &InstanceGraph, id: EntityId) -> Result<Vector3<f64>> {
    let direction = instance(graph, id)?;
    expect_kind(direction, EntityKind::Direction)?;

    let ratios = direction
        .get("direction_ratios")
        .map(|v| v.floats())
        .ok_or_else(|| Error::missing(id, "direction_ratios"))?;

    let vector = Vector3::new(
        ratios.first().copied().unwrap_or(0.0),
        ratios.get(1).copied().unwrap_or(0.0),
        ratios.get(2).copied().unwrap_or(0.0),
    );
    vector
        .try_normalize(EPSILON)
        .ok_or_else(|| Error::geometry(format!("zero-length direction #{}", id)))
}

/// Parse VECTOR: orientation scaled by magnitude
pub fn parse_vector(graph: &InstanceGraph, id: EntityId) -> Result<Vector3<f64>> {
    let vector = instance(graph, id)?;
    expect_kind(vector, EntityKind::Vector)?;

    let orientation = vector
        .get_ref("orientation")
        .ok_or_else(|| Error::missing(id, "orientation"))?;
    let magnitude = vector.get_float("magnitude").unwrap_or(1.0);
    Ok(parse_direction(graph, orientation)? * magnitude)
}

/// Parse AXIS2_PLACEMENT_3D
///
/// Axis defaults to +Z and the reference direction to +X.
pub fn parse_axis2_placement_3d(graph: &InstanceGraph, id: EntityId) -> Result<Frame> {
    let placement = instance(graph, id)?;
    expect_kind(placement, EntityKind::Axis2Placement3d)?;

    let location = placement
        .get_ref("location")
        .ok_or_else(|| Error::missing(id, "location"))?;
    let origin = parse_cartesian_point(graph, location)?;

    let axis = match placement.get_ref("axis") {
        Some(axis) => parse_direction(graph, axis)?,
        None => Vector3::z(),
    };
    let ref_direction = match placement.get_ref("ref_direction") {
        Some(dir) => parse_direction(graph, dir)?,
        None => Vector3::x(),
    };

    Ok(Frame::new(origin, axis, ref_direction))
}

/// Parse AXIS1_PLACEMENT into an origin and unit axis
pub fn parse_axis1_placement(graph: &InstanceGraph, id: EntityId) -> Result<(Point3<f64>, Vector3<f64>)> {
    let placement = instance(graph, id)?;
    expect_kind(placement, EntityKind::Axis1Placement)?;

    let location = placement
        .get_ref("location")
        .ok_or_else(|| Error::missing(id, "location"))?;
    let origin = parse_cartesian_point(graph, location)?;
    let axis = match placement.get_ref("axis") {
        Some(axis) => parse_direction(graph, axis)?,
        None => Vector3::z(),
    };
    Ok((origin, axis))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary segments of curved faces
//!
//! Edges are classified into lines and arcs, arcs on the same circle are
//! merged, and the result is reordered into a closed chain.

use nalgebra::{Point3, Vector3};

use crate::entities::{CurveDef, EdgeDef};
use crate::error::{Error, Result};
use crate::loops::{chain, Link};
use crate::transform::{points_coincide, tessellate_arc, Frame, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Arc,
    /// Closed arc
    Circle,
    Line,
}

/// Tessellated piece of a face boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub vertices: Vec<Point3<f64>>,
    /// +1 when the chain runs counter clockwise about `normal`
    pub sign: f64,
    pub center: Option<Point3<f64>>,
    pub radius: Option<f64>,
    pub normal: Option<Vector3<f64>>,
}

impl Segment {
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self {
            kind: SegmentKind::Line,
            vertices: vec![start, end],
            sign: 1.0,
            center: None,
            radius: None,
            normal: None,
        }
    }

    /// Arc from `start` to `end`; coincident endpoints give a full circle
    pub fn arc(
        center: Point3<f64>,
        normal: Vector3<f64>,
        radius: f64,
        start: Point3<f64>,
        end: Point3<f64>,
        sign: f64,
    ) -> Self {
        let kind = if points_coincide(&start, &end) {
            SegmentKind::Circle
        } else {
            SegmentKind::Arc
        };
        Self {
            kind,
            vertices: tessellate_arc(&center, &normal, radius, &start, &end, sign),
            sign,
            center: Some(center),
            radius: Some(radius),
            normal: Some(normal.normalize()),
        }
    }

    /// Classify an edge by its underlying curve
    pub fn from_edge(edge: &EdgeDef) -> Result<Self> {
        match &edge.curve {
            CurveDef::Line { .. } => Ok(Self::line(edge.start.point, edge.end.point)),
            CurveDef::Circle { frame, radius } => Ok(Self::arc(
                frame.origin,
                frame.z,
                *radius,
                edge.start.point,
                edge.end.point,
                if edge.forward { 1.0 } else { -1.0 },
            )),
            CurveDef::Unsupported(name) => Err(Error::unsupported(format!(
                "{} curve on edge #{}",
                name, edge.edge
            ))),
        }
    }

    #[inline]
    pub fn first(&self) -> Point3<f64> {
        self.vertices.first().copied().unwrap_or_else(Point3::origin)
    }

    #[inline]
    pub fn last(&self) -> Point3<f64> {
        self.vertices.last().copied().unwrap_or_else(Point3::origin)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind == SegmentKind::Circle
    }

    #[inline]
    pub fn is_curved(&self) -> bool {
        self.kind != SegmentKind::Line
    }

    /// Flip the chain direction
    pub fn reverse(&mut self) {
        self.vertices.reverse();
        self.sign = -self.sign;
    }

    /// Line direction from first to last point
    pub fn direction(&self) -> Vector3<f64> {
        self.last() - self.first()
    }

    /// Same center and radius, with parallel or anti-parallel normals
    pub fn same_circle(&self, other: &Segment) -> bool {
        match (
            (self.center, self.radius, self.normal),
            (other.center, other.radius, other.normal),
        ) {
            ((Some(c1), Some(r1), Some(n1)), (Some(c2), Some(r2), Some(n2))) => {
                (r1 - r2).abs() < EPSILON
                    && points_coincide(&c1, &c2)
                    && n1.dot(&n2).abs() > 1.0 - EPSILON
            }
            _ => false,
        }
    }

    /// Whether the circle of this segment is centered on, and square to, a frame's Z axis
    pub fn is_centered_on(&self, frame: &Frame) -> bool {
        match (self.center, self.normal) {
            (Some(center), Some(normal)) => {
                frame.distance_from_axis(&center) < EPSILON
                    && normal.dot(&frame.z).abs() > 1.0 - EPSILON
            }
            _ => false,
        }
    }

    fn has_endpoints_of(&self, other: &Segment) -> bool {
        let (a, b) = (self.first(), self.last());
        let (c, d) = (other.first(), other.last());
        (points_coincide(&a, &c) && points_coincide(&b, &d))
            || (points_coincide(&a, &d) && points_coincide(&b, &c))
    }

    /// Whether `other` describes the same piece of boundary
    pub fn duplicates(&self, other: &Segment) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            SegmentKind::Line => self.has_endpoints_of(other),
            SegmentKind::Arc => self.same_circle(other) && self.has_endpoints_of(other),
            SegmentKind::Circle => self.same_circle(other),
        }
    }
}

impl Link for Segment {
    type Node = Point3<f64>;

    fn start(&self) -> Point3<f64> {
        self.first()
    }

    fn end(&self) -> Point3<f64> {
        self.last()
    }

    fn reverse(&mut self) {
        Segment::reverse(self);
    }

    fn joins(a: &Point3<f64>, b: &Point3<f64>) -> bool {
        points_coincide(a, b)
    }
}

/// Merge two arcs of the same circle that share an endpoint
///
/// `b` is reversed when needed. The merged chain keeps `a`'s direction and
/// becomes a circle when its ends meet.
pub fn merge_arcs(a: &Segment, b: &Segment) -> Option<Segment> {
    if a.kind != SegmentKind::Arc || b.kind != SegmentKind::Arc || !a.same_circle(b) {
        return None;
    }

    let mut b = b.clone();
    let mut merged = a.clone();

    if points_coincide(&a.last(), &b.first()) || points_coincide(&a.last(), &b.last()) {
        if !points_coincide(&a.last(), &b.first()) {
            b.reverse();
        }
        merged.vertices.extend_from_slice(&b.vertices[1..]);
    } else if points_coincide(&a.first(), &b.last()) || points_coincide(&a.first(), &b.first()) {
        if !points_coincide(&a.first(), &b.last()) {
            b.reverse();
        }
        let mut vertices = b.vertices;
        vertices.extend_from_slice(&a.vertices[1..]);
        merged.vertices = vertices;
    } else {
        return None;
    }

    if merged.vertices.len() > 2 && points_coincide(&merged.first(), &merged.last()) {
        merged.kind = SegmentKind::Circle;
    }
    Some(merged)
}

/// Merge consecutive arcs of the same circle, including across the wrap
pub fn merge_adjacent(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        let combined = merged.last().and_then(|last| merge_arcs(last, &segment));
        match (combined, merged.last_mut()) {
            (Some(combined), Some(last)) => *last = combined,
            _ => merged.push(segment),
        }
    }

    if merged.len() > 1 {
        if let Some(combined) = merge_arcs(&merged[merged.len() - 1], &merged[0]) {
            merged[0] = combined;
            merged.pop();
        }
    }
    merged
}

/// Reorder open segments into a closed chain. Closed circles follow it.
pub fn order_segments(segments: Vec<Segment>) -> Result<Vec<Segment>> {
    let (closed, open): (Vec<Segment>, Vec<Segment>) =
        segments.into_iter().partition(Segment::is_closed);

    let mut ordered = if open.is_empty() { Vec::new() } else { chain(open)? };
    ordered.extend(closed);
    Ok(ordered)
}

/// Drop segments that repeat an earlier one
pub fn dedupe(segments: Vec<Segment>) -> Vec<Segment> {
    let mut unique: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if !unique.iter().any(|s| s.duplicates(&segment)) {
            unique.push(segment);
        }
    }
    unique
}

/// Points of a closed chain, without repeating shared endpoints
pub fn flatten(segments: &[Segment]) -> Vec<Point3<f64>> {
    let mut points = Vec::new();
    for segment in segments {
        let n = segment.vertices.len().saturating_sub(1);
        points.extend_from_slice(&segment.vertices[..n]);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arc(start: [f64; 3], end: [f64; 3]) -> Segment {
        Segment::arc(
            Point3::origin(),
            Vector3::z(),
            2.0,
            Point3::from(start),
            Point3::from(end),
            1.0,
        )
    }

    #[test]
    fn test_merge_shared_endpoint() {
        let a = arc([2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let b = arc([0.0, 2.0, 0.0], [-2.0, 0.0, 0.0]);

        let merged = merge_arcs(&a, &b).unwrap();
        let mut expected = a.vertices.clone();
        expected.extend_from_slice(&b.vertices[1..]);
        assert_eq!(merged.vertices, expected);
        assert_eq!(merged.kind, SegmentKind::Arc);
        assert_eq!(merged.sign, a.sign);
    }

    #[test]
    fn test_merge_reverses_when_only_start_touches() {
        let a = arc([2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let mut b = arc([0.0, 2.0, 0.0], [-2.0, 0.0, 0.0]);
        b.reverse();

        let merged = merge_arcs(&a, &b).unwrap();
        assert_eq!(merged.vertices.len(), a.vertices.len() + b.vertices.len() - 1);
        assert_eq!(merged.first(), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(merged.last(), Point3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_merge_into_circle() {
        let a = arc([2.0, 0.0, 0.0], [-2.0, 0.0, 0.0]);
        let b = arc([-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);

        let merged = merge_arcs(&a, &b).unwrap();
        assert_eq!(merged.kind, SegmentKind::Circle);
        assert_eq!(merged.vertices.len(), 33);
        for v in &merged.vertices {
            assert_relative_eq!(v.coords.norm(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_no_merge_across_circles() {
        let a = arc([2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let b = Segment::arc(
            Point3::new(0.0, 3.0, 0.0),
            Vector3::z(),
            1.0,
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            1.0,
        );
        assert!(merge_arcs(&a, &b).is_none());
        assert!(merge_arcs(&a, &Segment::line(a.last(), Point3::origin())).is_none());
    }

    #[test]
    fn test_merge_adjacent_wraps_around() {
        let segments = vec![
            arc([0.0, 2.0, 0.0], [-2.0, 0.0, 0.0]),
            Segment::line(Point3::new(-2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)),
            arc([2.0, 0.0, 0.0], [1.0, 3.0_f64.sqrt(), 0.0]),
            arc([1.0, 3.0_f64.sqrt(), 0.0], [0.0, 2.0, 0.0]),
        ];
        let merged = merge_adjacent(segments);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kind, SegmentKind::Arc);
        assert_eq!(merged[0].first(), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(merged[0].last(), Point3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_order_segments() {
        let p = |x: f64, y: f64| Point3::new(x, y, 0.0);
        let segments = vec![
            Segment::line(p(0.0, 0.0), p(1.0, 0.0)),
            Segment::line(p(0.0, 1.0), p(1.0, 1.0)),
            Segment::line(p(1.0, 0.0), p(1.0, 1.0)),
            Segment::line(p(0.0, 1.0), p(0.0, 0.0)),
        ];
        let ordered = order_segments(segments).unwrap();
        let corners: Vec<_> = ordered.iter().map(Segment::first).collect();
        assert_eq!(corners, vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]);
        assert_eq!(flatten(&ordered).len(), 4);

        let open = vec![
            Segment::line(p(0.0, 0.0), p(1.0, 0.0)),
            Segment::line(p(1.0, 0.0), p(1.0, 1.0)),
        ];
        assert!(matches!(order_segments(open), Err(Error::LoopIntegrity(_))));
    }

    #[test]
    fn test_dedupe_coincident_circles() {
        let start = Point3::new(2.0, 0.0, 0.0);
        let outer = Segment::arc(Point3::origin(), Vector3::z(), 2.0, start, start, 1.0);
        let inner = Segment::arc(Point3::origin(), -Vector3::z(), 2.0, start, start, 1.0);
        let smaller = Segment::arc(
            Point3::origin(),
            Vector3::z(),
            1.0,
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            1.0,
        );

        let unique = dedupe(vec![outer, inner, smaller]);
        assert_eq!(unique.len(), 2);
        assert_relative_eq!(unique[1].radius.unwrap(), 1.0);
    }
}

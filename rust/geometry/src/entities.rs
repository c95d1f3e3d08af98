// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed views over resolved B-rep instances
//!
//! Face processors work on these plain structs instead of walking field
//! maps. Each view is read out of the instance graph after resolution, so
//! vertex buffer indices and seam associations are already in place.

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use stp_lite_core::{EntityId, EntityKind, InstanceGraph};

use crate::error::{Error, Result};
use crate::transform::{
    expect_kind, instance, parse_axis1_placement, parse_axis2_placement_3d,
    parse_cartesian_point, parse_vector, points_coincide, Frame,
};

/// A VERTEX_POINT with its mesh buffer index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRef {
    pub vertex: EntityId,
    /// Index stamped by the vertex load hook
    pub index: Option<u32>,
    pub point: Point3<f64>,
}

impl VertexRef {
    pub fn from_graph(graph: &InstanceGraph, id: EntityId) -> Result<Self> {
        let vertex = instance(graph, id)?;
        expect_kind(vertex, EntityKind::VertexPoint)?;

        let geometry = vertex
            .get_ref("vertex_geometry")
            .ok_or_else(|| Error::missing(id, "vertex_geometry"))?;

        Ok(Self {
            vertex: id,
            index: vertex.buffer_index,
            point: parse_cartesian_point(graph, geometry)?,
        })
    }
}

/// 3D curve underlying an edge
#[derive(Debug, Clone, PartialEq)]
pub enum CurveDef {
    Line {
        origin: Point3<f64>,
        direction: Vector3<f64>,
    },
    Circle {
        frame: Frame,
        radius: f64,
    },
    /// Type name of a curve with no tessellation rule
    Unsupported(String),
}

impl CurveDef {
    /// Read an edge geometry. The flag is set for seam curves.
    ///
    /// SURFACE_CURVE and SEAM_CURVE are unwrapped to their 3D curve.
    pub fn from_graph(graph: &InstanceGraph, id: EntityId) -> Result<(Self, bool)> {
        let curve = instance(graph, id)?;

        match curve.kind {
            EntityKind::SurfaceCurve | EntityKind::SeamCurve => {
                let inner = curve
                    .get_ref("curve_3d")
                    .ok_or_else(|| Error::missing(id, "curve_3d"))?;
                let (def, _) = Self::from_graph(graph, inner)?;
                Ok((def, curve.kind == EntityKind::SeamCurve))
            }
            EntityKind::Line => {
                let pnt = curve.get_ref("pnt").ok_or_else(|| Error::missing(id, "pnt"))?;
                let dir = curve.get_ref("dir").ok_or_else(|| Error::missing(id, "dir"))?;
                Ok((
                    Self::Line {
                        origin: parse_cartesian_point(graph, pnt)?,
                        direction: parse_vector(graph, dir)?,
                    },
                    false,
                ))
            }
            EntityKind::Circle => {
                let position = curve
                    .get_ref("position")
                    .ok_or_else(|| Error::missing(id, "position"))?;
                let radius = curve
                    .get_float("radius")
                    .ok_or_else(|| Error::missing(id, "radius"))?;
                Ok((
                    Self::Circle {
                        frame: parse_axis2_placement_3d(graph, position)?,
                        radius,
                    },
                    false,
                ))
            }
            _ => {
                let name = if curve.type_name.is_empty() {
                    "complex".to_string()
                } else {
                    curve.type_name.clone()
                };
                Ok((Self::Unsupported(name), false))
            }
        }
    }
}

/// An edge as traversed by its loop
///
/// `start` and `end` already follow the oriented edge's direction.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDef {
    /// The EDGE_CURVE
    pub edge: EntityId,
    pub start: VertexRef,
    pub end: VertexRef,
    pub curve: CurveDef,
    pub seam: bool,
    /// Traversal follows the curve's own direction
    pub forward: bool,
}

impl EdgeDef {
    /// Read an EDGE_CURVE in its own direction
    pub fn from_edge_curve(graph: &InstanceGraph, id: EntityId) -> Result<Self> {
        let edge = instance(graph, id)?;
        expect_kind(edge, EntityKind::EdgeCurve)?;

        let start = edge
            .get_ref("edge_start")
            .ok_or_else(|| Error::missing(id, "edge_start"))?;
        let end = edge
            .get_ref("edge_end")
            .ok_or_else(|| Error::missing(id, "edge_end"))?;
        let geometry = edge
            .get_ref("edge_geometry")
            .ok_or_else(|| Error::missing(id, "edge_geometry"))?;
        let (curve, seam) = CurveDef::from_graph(graph, geometry)?;

        Ok(Self {
            edge: id,
            start: VertexRef::from_graph(graph, start)?,
            end: VertexRef::from_graph(graph, end)?,
            curve,
            seam,
            forward: edge.get_bool("same_sense").unwrap_or(true),
        })
    }

    /// Read an ORIENTED_EDGE, flipping the edge when its orientation is false
    pub fn from_oriented_edge(graph: &InstanceGraph, id: EntityId) -> Result<Self> {
        let oriented = instance(graph, id)?;
        expect_kind(oriented, EntityKind::OrientedEdge)?;

        let element = oriented
            .get_ref("edge_element")
            .ok_or_else(|| Error::missing(id, "edge_element"))?;
        let orientation = oriented.get_bool("orientation").unwrap_or(true);

        let mut edge = Self::from_edge_curve(graph, element)?;
        if !orientation {
            std::mem::swap(&mut edge.start, &mut edge.end);
        }
        edge.forward = edge.forward == orientation;
        Ok(edge)
    }

    /// Both ends on the same point, e.g. a full circle
    #[inline]
    pub fn is_closed(&self) -> bool {
        points_coincide(&self.start.point, &self.end.point)
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self.curve, CurveDef::Line { .. })
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        matches!(self.curve, CurveDef::Circle { .. })
    }
}

/// Contents of a face bound
#[derive(Debug, Clone, PartialEq)]
pub enum LoopDef {
    Edges(Vec<EdgeDef>),
    /// Degenerate loop on a single vertex, e.g. a cone apex
    Vertex(VertexRef),
}

/// FACE_BOUND or FACE_OUTER_BOUND
#[derive(Debug, Clone, PartialEq)]
pub struct BoundDef {
    pub id: EntityId,
    pub outer: bool,
    pub orientation: bool,
    pub boundary: LoopDef,
}

impl BoundDef {
    pub fn from_graph(graph: &InstanceGraph, id: EntityId) -> Result<Self> {
        let bound = instance(graph, id)?;
        if !bound.kind.is_bound() {
            return Err(Error::geometry(format!(
                "expected a face bound at #{}, found {}",
                id, bound.type_name
            )));
        }

        let loop_id = bound
            .get_ref("bound")
            .ok_or_else(|| Error::missing(id, "bound"))?;
        let path = instance(graph, loop_id)?;

        let boundary = match path.kind {
            EntityKind::EdgeLoop => LoopDef::Edges(
                path.get_refs("edge_list")
                    .into_iter()
                    .map(|edge| EdgeDef::from_oriented_edge(graph, edge))
                    .collect::<Result<_>>()?,
            ),
            EntityKind::VertexLoop => {
                let vertex = path
                    .get_ref("loop_vertex")
                    .ok_or_else(|| Error::missing(loop_id, "loop_vertex"))?;
                LoopDef::Vertex(VertexRef::from_graph(graph, vertex)?)
            }
            _ => {
                return Err(Error::geometry(format!(
                    "unexpected loop #{} {}",
                    loop_id, path.type_name
                )))
            }
        };

        Ok(Self {
            id,
            outer: bound.kind == EntityKind::FaceOuterBound,
            orientation: bound.get_bool("orientation").unwrap_or(true),
            boundary,
        })
    }

    /// Edges of an edge loop; empty for a vertex loop
    pub fn edges(&self) -> &[EdgeDef] {
        match &self.boundary {
            LoopDef::Edges(edges) => edges,
            LoopDef::Vertex(_) => &[],
        }
    }
}

/// Surface geometry of an advanced face
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceDef {
    Plane {
        frame: Frame,
    },
    Cylinder {
        frame: Frame,
        radius: f64,
    },
    Cone {
        frame: Frame,
        radius: f64,
        semi_angle: f64,
    },
    Sphere {
        frame: Frame,
        radius: f64,
    },
    Torus {
        frame: Frame,
        major_radius: f64,
        minor_radius: f64,
    },
    /// Frame Z is the axis of revolution
    Revolution {
        frame: Frame,
    },
}

impl SurfaceDef {
    pub fn from_graph(graph: &InstanceGraph, id: EntityId) -> Result<Self> {
        let surface = instance(graph, id)?;

        let frame = || -> Result<Frame> {
            let position = surface
                .get_ref("position")
                .ok_or_else(|| Error::missing(id, "position"))?;
            parse_axis2_placement_3d(graph, position)
        };
        let float = |field: &'static str| -> Result<f64> {
            surface
                .get_float(field)
                .ok_or_else(|| Error::missing(id, field))
        };

        match surface.kind {
            EntityKind::Plane => Ok(Self::Plane { frame: frame()? }),
            EntityKind::CylindricalSurface => Ok(Self::Cylinder {
                frame: frame()?,
                radius: float("radius")?,
            }),
            EntityKind::ConicalSurface => Ok(Self::Cone {
                frame: frame()?,
                radius: float("radius")?,
                semi_angle: float("semi_angle")?,
            }),
            EntityKind::SphericalSurface => Ok(Self::Sphere {
                frame: frame()?,
                radius: float("radius")?,
            }),
            EntityKind::ToroidalSurface => Ok(Self::Torus {
                frame: frame()?,
                major_radius: float("major_radius")?,
                minor_radius: float("minor_radius")?,
            }),
            EntityKind::SurfaceOfRevolution => {
                let axis = surface
                    .get_ref("axis_position")
                    .ok_or_else(|| Error::missing(id, "axis_position"))?;
                let (origin, axis) = parse_axis1_placement(graph, axis)?;
                Ok(Self::Revolution {
                    frame: Frame::new(origin, axis, Vector3::x()),
                })
            }
            _ => Err(Error::unsupported(format!(
                "{} surface #{}",
                surface.type_name, id
            ))),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Plane { .. } => EntityKind::Plane,
            Self::Cylinder { .. } => EntityKind::CylindricalSurface,
            Self::Cone { .. } => EntityKind::ConicalSurface,
            Self::Sphere { .. } => EntityKind::SphericalSurface,
            Self::Torus { .. } => EntityKind::ToroidalSurface,
            Self::Revolution { .. } => EntityKind::SurfaceOfRevolution,
        }
    }

    pub fn frame(&self) -> &Frame {
        match self {
            Self::Plane { frame }
            | Self::Cylinder { frame, .. }
            | Self::Cone { frame, .. }
            | Self::Sphere { frame, .. }
            | Self::Torus { frame, .. }
            | Self::Revolution { frame } => frame,
        }
    }
}

/// An ADVANCED_FACE ready for reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDef {
    pub id: EntityId,
    pub surface_id: EntityId,
    pub surface: SurfaceDef,
    pub bounds: SmallVec<[BoundDef; 2]>,
    pub same_sense: bool,
    /// Seam edges associated with the surface by the edge load hook
    pub seams: Vec<EdgeDef>,
}

impl FaceDef {
    pub fn from_graph(graph: &InstanceGraph, id: EntityId) -> Result<Self> {
        let face = instance(graph, id)?;
        expect_kind(face, EntityKind::AdvancedFace)?;

        let surface_id = face
            .get_ref("face_geometry")
            .ok_or_else(|| Error::missing(id, "face_geometry"))?;
        let surface = SurfaceDef::from_graph(graph, surface_id)?;

        let bounds = face
            .get_refs("bounds")
            .into_iter()
            .map(|bound| BoundDef::from_graph(graph, bound))
            .collect::<Result<SmallVec<[BoundDef; 2]>>>()?;
        if bounds.is_empty() {
            return Err(Error::missing(id, "bounds"));
        }

        let associated: Vec<EntityId> = graph
            .get(surface_id)
            .map(|s| s.associated.to_vec())
            .unwrap_or_default();
        let seams = associated
            .into_iter()
            .map(|edge| EdgeDef::from_edge_curve(graph, edge))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            surface_id,
            surface,
            bounds,
            same_sense: face.get_bool("same_sense").unwrap_or(true),
            seams,
        })
    }

    /// The outer bound, or the first bound when none is marked outer
    pub fn authoritative_bound(&self) -> Option<&BoundDef> {
        self.bounds
            .iter()
            .find(|b| b.outer)
            .or_else(|| self.bounds.first())
    }

    /// Every edge of every bound
    pub fn edges(&self) -> impl Iterator<Item = &EdgeDef> {
        self.bounds.iter().flat_map(|b| b.edges().iter())
    }

    /// A seam edge in the face's own loops
    pub fn loop_seam(&self) -> Option<&EdgeDef> {
        self.edges().find(|e| e.seam && !e.is_closed())
    }

    /// A seam edge associated with the face's surface
    pub fn associated_seam(&self) -> Option<&EdgeDef> {
        self.seams.iter().find(|e| !e.is_closed())
    }
}

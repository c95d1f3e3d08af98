// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP entity kinds
//!
//! Fast type checking using an enum instead of string comparison. Only the
//! entity types needed to express a B-rep solid and to recover its product
//! name are known; everything else is `Unknown`.

use std::fmt;

/// Supported STEP entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    // Points, directions and placements
    CartesianPoint,
    Direction,
    Vector,
    Axis1Placement,
    Axis2Placement3d,

    // Curves
    Line,
    Circle,
    Ellipse,
    SurfaceCurve,
    SeamCurve,
    Pcurve,
    DefinitionalRepresentation,

    // Surfaces
    Plane,
    CylindricalSurface,
    ConicalSurface,
    SphericalSurface,
    ToroidalSurface,
    SurfaceOfRevolution,

    // Topology
    VertexPoint,
    EdgeCurve,
    OrientedEdge,
    EdgeLoop,
    VertexLoop,
    FaceBound,
    FaceOuterBound,
    AdvancedFace,
    ClosedShell,
    OpenShell,
    ManifoldSolidBrep,

    // Representations
    AdvancedBrepShapeRepresentation,
    ShapeRepresentation,
    ShapeRepresentationRelationship,
    ShapeDefinitionRepresentation,

    // Product structure
    ApplicationContext,
    MechanicalContext,
    ProductContext,
    ProductDefinitionContext,
    Product,
    ProductType,
    ProductRelatedProductCategory,
    ProductDefinitionFormation,
    ProductDefinitionFormationWithSpecifiedSource,
    ProductDefinition,
    ProductDefinitionShape,

    // Representation contexts
    GeometricRepresentationContext,
    GlobalUnitAssignedContext,
    GlobalUncertaintyAssignedContext,
    RepresentationContext,
    ParametricRepresentationContext,

    /// Any type outside the supported set
    Unknown,
}

impl EntityKind {
    /// Parse an entity kind from its STEP type name
    pub fn from_name(name: &str) -> Self {
        match Self::lookup(name) {
            Self::Unknown if name.bytes().any(|b| b.is_ascii_lowercase()) => {
                Self::lookup(&name.to_ascii_uppercase())
            }
            kind => kind,
        }
    }

    fn lookup(name: &str) -> Self {
        match name {
            "CARTESIAN_POINT" => Self::CartesianPoint,
            "DIRECTION" => Self::Direction,
            "VECTOR" => Self::Vector,
            "AXIS1_PLACEMENT" => Self::Axis1Placement,
            "AXIS2_PLACEMENT_3D" => Self::Axis2Placement3d,

            "LINE" => Self::Line,
            "CIRCLE" => Self::Circle,
            "ELLIPSE" => Self::Ellipse,
            "SURFACE_CURVE" => Self::SurfaceCurve,
            "SEAM_CURVE" => Self::SeamCurve,
            "PCURVE" => Self::Pcurve,
            "DEFINITIONAL_REPRESENTATION" => Self::DefinitionalRepresentation,

            "PLANE" => Self::Plane,
            "CYLINDRICAL_SURFACE" => Self::CylindricalSurface,
            "CONICAL_SURFACE" => Self::ConicalSurface,
            "SPHERICAL_SURFACE" => Self::SphericalSurface,
            "TOROIDAL_SURFACE" => Self::ToroidalSurface,
            "SURFACE_OF_REVOLUTION" => Self::SurfaceOfRevolution,

            "VERTEX_POINT" => Self::VertexPoint,
            "EDGE_CURVE" => Self::EdgeCurve,
            "ORIENTED_EDGE" => Self::OrientedEdge,
            "EDGE_LOOP" => Self::EdgeLoop,
            "VERTEX_LOOP" => Self::VertexLoop,
            "FACE_BOUND" => Self::FaceBound,
            "FACE_OUTER_BOUND" => Self::FaceOuterBound,
            "ADVANCED_FACE" => Self::AdvancedFace,
            "CLOSED_SHELL" => Self::ClosedShell,
            "OPEN_SHELL" => Self::OpenShell,
            "MANIFOLD_SOLID_BREP" => Self::ManifoldSolidBrep,

            "ADVANCED_BREP_SHAPE_REPRESENTATION" => Self::AdvancedBrepShapeRepresentation,
            "SHAPE_REPRESENTATION" => Self::ShapeRepresentation,
            "SHAPE_REPRESENTATION_RELATIONSHIP" => Self::ShapeRepresentationRelationship,
            "SHAPE_DEFINITION_REPRESENTATION" => Self::ShapeDefinitionRepresentation,

            "APPLICATION_CONTEXT" => Self::ApplicationContext,
            "MECHANICAL_CONTEXT" => Self::MechanicalContext,
            "PRODUCT_CONTEXT" => Self::ProductContext,
            "PRODUCT_DEFINITION_CONTEXT" => Self::ProductDefinitionContext,
            "PRODUCT" => Self::Product,
            "PRODUCT_TYPE" => Self::ProductType,
            "PRODUCT_RELATED_PRODUCT_CATEGORY" => Self::ProductRelatedProductCategory,
            "PRODUCT_DEFINITION_FORMATION" => Self::ProductDefinitionFormation,
            "PRODUCT_DEFINITION_FORMATION_WITH_SPECIFIED_SOURCE" => {
                Self::ProductDefinitionFormationWithSpecifiedSource
            }
            "PRODUCT_DEFINITION" => Self::ProductDefinition,
            "PRODUCT_DEFINITION_SHAPE" => Self::ProductDefinitionShape,

            "GEOMETRIC_REPRESENTATION_CONTEXT" => Self::GeometricRepresentationContext,
            "GLOBAL_UNIT_ASSIGNED_CONTEXT" => Self::GlobalUnitAssignedContext,
            "GLOBAL_UNCERTAINTY_ASSIGNED_CONTEXT" => Self::GlobalUncertaintyAssignedContext,
            "REPRESENTATION_CONTEXT" => Self::RepresentationContext,
            "PARAMETRIC_REPRESENTATION_CONTEXT" => Self::ParametricRepresentationContext,

            _ => Self::Unknown,
        }
    }

    /// STEP type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CartesianPoint => "CARTESIAN_POINT",
            Self::Direction => "DIRECTION",
            Self::Vector => "VECTOR",
            Self::Axis1Placement => "AXIS1_PLACEMENT",
            Self::Axis2Placement3d => "AXIS2_PLACEMENT_3D",

            Self::Line => "LINE",
            Self::Circle => "CIRCLE",
            Self::Ellipse => "ELLIPSE",
            Self::SurfaceCurve => "SURFACE_CURVE",
            Self::SeamCurve => "SEAM_CURVE",
            Self::Pcurve => "PCURVE",
            Self::DefinitionalRepresentation => "DEFINITIONAL_REPRESENTATION",

            Self::Plane => "PLANE",
            Self::CylindricalSurface => "CYLINDRICAL_SURFACE",
            Self::ConicalSurface => "CONICAL_SURFACE",
            Self::SphericalSurface => "SPHERICAL_SURFACE",
            Self::ToroidalSurface => "TOROIDAL_SURFACE",
            Self::SurfaceOfRevolution => "SURFACE_OF_REVOLUTION",

            Self::VertexPoint => "VERTEX_POINT",
            Self::EdgeCurve => "EDGE_CURVE",
            Self::OrientedEdge => "ORIENTED_EDGE",
            Self::EdgeLoop => "EDGE_LOOP",
            Self::VertexLoop => "VERTEX_LOOP",
            Self::FaceBound => "FACE_BOUND",
            Self::FaceOuterBound => "FACE_OUTER_BOUND",
            Self::AdvancedFace => "ADVANCED_FACE",
            Self::ClosedShell => "CLOSED_SHELL",
            Self::OpenShell => "OPEN_SHELL",
            Self::ManifoldSolidBrep => "MANIFOLD_SOLID_BREP",

            Self::AdvancedBrepShapeRepresentation => "ADVANCED_BREP_SHAPE_REPRESENTATION",
            Self::ShapeRepresentation => "SHAPE_REPRESENTATION",
            Self::ShapeRepresentationRelationship => "SHAPE_REPRESENTATION_RELATIONSHIP",
            Self::ShapeDefinitionRepresentation => "SHAPE_DEFINITION_REPRESENTATION",

            Self::ApplicationContext => "APPLICATION_CONTEXT",
            Self::MechanicalContext => "MECHANICAL_CONTEXT",
            Self::ProductContext => "PRODUCT_CONTEXT",
            Self::ProductDefinitionContext => "PRODUCT_DEFINITION_CONTEXT",
            Self::Product => "PRODUCT",
            Self::ProductType => "PRODUCT_TYPE",
            Self::ProductRelatedProductCategory => "PRODUCT_RELATED_PRODUCT_CATEGORY",
            Self::ProductDefinitionFormation => "PRODUCT_DEFINITION_FORMATION",
            Self::ProductDefinitionFormationWithSpecifiedSource => {
                "PRODUCT_DEFINITION_FORMATION_WITH_SPECIFIED_SOURCE"
            }
            Self::ProductDefinition => "PRODUCT_DEFINITION",
            Self::ProductDefinitionShape => "PRODUCT_DEFINITION_SHAPE",

            Self::GeometricRepresentationContext => "GEOMETRIC_REPRESENTATION_CONTEXT",
            Self::GlobalUnitAssignedContext => "GLOBAL_UNIT_ASSIGNED_CONTEXT",
            Self::GlobalUncertaintyAssignedContext => "GLOBAL_UNCERTAINTY_ASSIGNED_CONTEXT",
            Self::RepresentationContext => "REPRESENTATION_CONTEXT",
            Self::ParametricRepresentationContext => "PARAMETRIC_REPRESENTATION_CONTEXT",

            Self::Unknown => "UNKNOWN",
        }
    }

    /// Check if this is a surface that can carry an advanced face
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            Self::Plane
                | Self::CylindricalSurface
                | Self::ConicalSurface
                | Self::SphericalSurface
                | Self::ToroidalSurface
                | Self::SurfaceOfRevolution
        )
    }

    /// Check if this is a 3D curve an edge can lie on
    pub fn is_curve(&self) -> bool {
        matches!(
            self,
            Self::Line | Self::Circle | Self::Ellipse | Self::SurfaceCurve | Self::SeamCurve
        )
    }

    /// Check if this is a face bound
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::FaceBound | Self::FaceOuterBound)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

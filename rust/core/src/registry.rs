// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema registry
//!
//! Static table mapping each supported entity kind to its positional field
//! descriptors. A field either accepts references to a union of kinds
//! (empty = any) or carries a scalar coercion.

use rustc_hash::FxHashMap;

use crate::schema::EntityKind;

/// Scalar coercion applied to a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coercion {
    /// Keep the token as classified
    None,
    Float,
    Int,
    Str,
    /// Typed value such as POSITIVE_LENGTH_MEASURE(0.1)
    Func,
    /// Collect a list parameter, coercing each element
    Multiple(&'static Coercion),
}

/// Positional field descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Field name; empty for a position that is skipped
    pub name: &'static str,
    /// Accepted referenced kinds; empty accepts any
    pub accepts: &'static [EntityKind],
    pub coercion: Coercion,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        accepts: &'static [EntityKind],
        coercion: Coercion,
    ) -> Self {
        Self {
            name,
            accepts,
            coercion,
        }
    }

    /// A position whose value is not stored
    pub const fn ignored() -> Self {
        Self::new("", &[], Coercion::None)
    }

    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether a referenced instance of `kind` is acceptable here
    #[inline]
    pub fn accepts_kind(&self, kind: EntityKind) -> bool {
        self.accepts.is_empty() || self.accepts.contains(&kind)
    }
}

/// Schema of one entity kind
#[derive(Debug, Clone, Copy)]
pub enum EntitySchema {
    /// Structural marker with no stored fields
    Marker,
    /// Arity-variant field lists; the one matching the parameter count wins
    Variants(&'static [&'static [FieldSpec]]),
}

impl EntitySchema {
    /// Select the field list for a parameter count. On mismatch, returns
    /// the accepted arities.
    pub fn variant_for(&self, arity: usize) -> Result<&'static [FieldSpec], Vec<usize>> {
        match self {
            Self::Marker => Ok(&[]),
            Self::Variants(variants) => variants
                .iter()
                .find(|fields| fields.len() == arity)
                .copied()
                .ok_or_else(|| variants.iter().map(|f| f.len()).collect()),
        }
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, &[], Coercion::Str)
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, &[], Coercion::Float)
}

const fn value(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, &[], Coercion::None)
}

const fn entity(name: &'static str, accepts: &'static [EntityKind]) -> FieldSpec {
    FieldSpec::new(name, accepts, Coercion::None)
}

const FLOATS: Coercion = Coercion::Multiple(&Coercion::Float);
const IGNORED: FieldSpec = FieldSpec::ignored();

use EntityKind as K;

const POINT: &[EntityKind] = &[K::CartesianPoint];
const DIRECTION: &[EntityKind] = &[K::Direction];
const PLACEMENT: &[EntityKind] = &[K::Axis2Placement3d];
const CURVES_3D: &[EntityKind] = &[K::Line, K::Circle, K::Ellipse];
const EDGE_GEOMETRY: &[EntityKind] = &[
    K::SurfaceCurve,
    K::SeamCurve,
    K::Line,
    K::Circle,
    K::Ellipse,
];
const SURFACES: &[EntityKind] = &[
    K::Plane,
    K::CylindricalSurface,
    K::ConicalSurface,
    K::SphericalSurface,
    K::ToroidalSurface,
    K::SurfaceOfRevolution,
];
const CURVE_GEOMETRY: &[EntityKind] = &[
    K::Pcurve,
    K::Plane,
    K::CylindricalSurface,
    K::ConicalSurface,
    K::SphericalSurface,
    K::ToroidalSurface,
    K::SurfaceOfRevolution,
];
const REPRESENTATIONS: &[EntityKind] = &[K::ShapeRepresentation, K::AdvancedBrepShapeRepresentation];
const CONTEXTS: &[EntityKind] = &[K::ProductContext, K::MechanicalContext];
const FORMATIONS: &[EntityKind] = &[
    K::ProductDefinitionFormation,
    K::ProductDefinitionFormationWithSpecifiedSource,
];

const CARTESIAN_POINT: &[FieldSpec] = &[text("name"), FieldSpec::new("coordinates", &[], FLOATS)];
const DIRECTION_FIELDS: &[FieldSpec] = &[
    text("name"),
    FieldSpec::new("direction_ratios", &[], FLOATS),
];
const VECTOR: &[FieldSpec] = &[
    text("name"),
    entity("orientation", DIRECTION),
    float("magnitude"),
];
const AXIS1_PLACEMENT: &[FieldSpec] = &[
    text("name"),
    entity("location", POINT),
    entity("axis", DIRECTION),
];
const AXIS2_PLACEMENT_3D: &[FieldSpec] = &[
    text("name"),
    entity("location", POINT),
    entity("axis", DIRECTION),
    entity("ref_direction", DIRECTION),
];

const LINE: &[FieldSpec] = &[
    text("name"),
    entity("pnt", POINT),
    entity("dir", &[K::Vector]),
];
const CIRCLE: &[FieldSpec] = &[text("name"), entity("position", PLACEMENT), float("radius")];
const ELLIPSE: &[FieldSpec] = &[
    text("name"),
    entity("position", PLACEMENT),
    float("semi_axis_1"),
    float("semi_axis_2"),
];
const SURFACE_CURVE: &[FieldSpec] = &[
    text("name"),
    entity("curve_3d", CURVES_3D),
    entity("associated_geometry", CURVE_GEOMETRY),
    value("master_representation"),
];
const PCURVE: &[FieldSpec] = &[
    text("name"),
    entity("basis_surface", SURFACES),
    entity("reference_to_curve", &[K::DefinitionalRepresentation]),
];
// Parametric 2D geometry is not used for meshing
const DEFINITIONAL_REPRESENTATION: &[FieldSpec] = &[text("name"), IGNORED, IGNORED];

const PLANE: &[FieldSpec] = &[text("name"), entity("position", PLACEMENT)];
const CYLINDRICAL_SURFACE: &[FieldSpec] = &[
    text("name"),
    entity("position", PLACEMENT),
    float("radius"),
];
const CONICAL_SURFACE: &[FieldSpec] = &[
    text("name"),
    entity("position", PLACEMENT),
    float("radius"),
    float("semi_angle"),
];
const SPHERICAL_SURFACE: &[FieldSpec] = &[
    text("name"),
    entity("position", PLACEMENT),
    float("radius"),
];
const TOROIDAL_SURFACE: &[FieldSpec] = &[
    text("name"),
    entity("position", PLACEMENT),
    float("major_radius"),
    float("minor_radius"),
];
const SURFACE_OF_REVOLUTION: &[FieldSpec] = &[
    text("name"),
    entity("swept_curve", CURVES_3D),
    entity("axis_position", &[K::Axis1Placement]),
];

const VERTEX_POINT: &[FieldSpec] = &[text("name"), entity("vertex_geometry", POINT)];
const EDGE_CURVE: &[FieldSpec] = &[
    text("name"),
    entity("edge_start", &[K::VertexPoint]),
    entity("edge_end", &[K::VertexPoint]),
    entity("edge_geometry", EDGE_GEOMETRY),
    value("same_sense"),
];
// Start and end are derived (*) from the referenced edge
const ORIENTED_EDGE: &[FieldSpec] = &[
    text("name"),
    IGNORED,
    IGNORED,
    entity("edge_element", &[K::EdgeCurve]),
    value("orientation"),
];
const EDGE_LOOP: &[FieldSpec] = &[text("name"), entity("edge_list", &[K::OrientedEdge])];
const VERTEX_LOOP: &[FieldSpec] = &[text("name"), entity("loop_vertex", &[K::VertexPoint])];
const FACE_BOUND: &[FieldSpec] = &[
    text("name"),
    entity("bound", &[K::EdgeLoop, K::VertexLoop]),
    value("orientation"),
];
const ADVANCED_FACE: &[FieldSpec] = &[
    text("name"),
    entity("bounds", &[K::FaceBound, K::FaceOuterBound]),
    entity("face_geometry", SURFACES),
    value("same_sense"),
];
const SHELL: &[FieldSpec] = &[text("name"), entity("cfs_faces", &[K::AdvancedFace])];
const MANIFOLD_SOLID_BREP: &[FieldSpec] = &[text("name"), entity("outer", &[K::ClosedShell])];

const ADVANCED_BREP_SHAPE_REPRESENTATION: &[FieldSpec] = &[
    text("name"),
    entity("items", &[K::Axis2Placement3d, K::ManifoldSolidBrep]),
    IGNORED,
];
const SHAPE_REPRESENTATION: &[FieldSpec] = &[text("name"), IGNORED, IGNORED];
const SHAPE_REPRESENTATION_RELATIONSHIP: &[FieldSpec] = &[
    text("name"),
    text("description"),
    entity("rep_1", REPRESENTATIONS),
    entity("rep_2", REPRESENTATIONS),
];
const SHAPE_DEFINITION_REPRESENTATION: &[FieldSpec] = &[
    entity("definition", &[K::ProductDefinitionShape]),
    entity("used_representation", REPRESENTATIONS),
];

const APPLICATION_CONTEXT: &[FieldSpec] = &[text("application")];
const PRODUCT_CONTEXT: &[FieldSpec] = &[
    text("name"),
    entity("frame_of_reference", &[K::ApplicationContext]),
    text("discipline_type"),
];
const PRODUCT_DEFINITION_CONTEXT: &[FieldSpec] = &[
    text("name"),
    entity("frame_of_reference", &[K::ApplicationContext]),
    text("life_cycle_stage"),
];
const PRODUCT: &[FieldSpec] = &[
    text("id"),
    text("name"),
    text("description"),
    entity("frame_of_reference", CONTEXTS),
];
const PRODUCT_CATEGORY: &[FieldSpec] = &[
    text("name"),
    text("description"),
    entity("products", &[K::Product]),
];
const PRODUCT_DEFINITION_FORMATION: &[FieldSpec] = &[
    text("id"),
    text("description"),
    entity("of_product", &[K::Product]),
];
const PRODUCT_DEFINITION_FORMATION_WITH_SOURCE: &[FieldSpec] = &[
    text("id"),
    text("description"),
    entity("of_product", &[K::Product]),
    value("make_or_buy"),
];
const PRODUCT_DEFINITION: &[FieldSpec] = &[
    text("id"),
    text("description"),
    entity("formation", FORMATIONS),
    entity("frame_of_reference", &[K::ProductDefinitionContext]),
];
const PRODUCT_DEFINITION_SHAPE: &[FieldSpec] = &[
    text("name"),
    text("description"),
    entity("definition", &[K::ProductDefinition]),
];

/// Field tables per kind. Each kind currently has a single arity variant.
const SCHEMAS: &[(EntityKind, &[&[FieldSpec]])] = &[
    (K::CartesianPoint, &[CARTESIAN_POINT]),
    (K::Direction, &[DIRECTION_FIELDS]),
    (K::Vector, &[VECTOR]),
    (K::Axis1Placement, &[AXIS1_PLACEMENT]),
    (K::Axis2Placement3d, &[AXIS2_PLACEMENT_3D]),
    (K::Line, &[LINE]),
    (K::Circle, &[CIRCLE]),
    (K::Ellipse, &[ELLIPSE]),
    (K::SurfaceCurve, &[SURFACE_CURVE]),
    (K::SeamCurve, &[SURFACE_CURVE]),
    (K::Pcurve, &[PCURVE]),
    (K::DefinitionalRepresentation, &[DEFINITIONAL_REPRESENTATION]),
    (K::Plane, &[PLANE]),
    (K::CylindricalSurface, &[CYLINDRICAL_SURFACE]),
    (K::ConicalSurface, &[CONICAL_SURFACE]),
    (K::SphericalSurface, &[SPHERICAL_SURFACE]),
    (K::ToroidalSurface, &[TOROIDAL_SURFACE]),
    (K::SurfaceOfRevolution, &[SURFACE_OF_REVOLUTION]),
    (K::VertexPoint, &[VERTEX_POINT]),
    (K::EdgeCurve, &[EDGE_CURVE]),
    (K::OrientedEdge, &[ORIENTED_EDGE]),
    (K::EdgeLoop, &[EDGE_LOOP]),
    (K::VertexLoop, &[VERTEX_LOOP]),
    (K::FaceBound, &[FACE_BOUND]),
    (K::FaceOuterBound, &[FACE_BOUND]),
    (K::AdvancedFace, &[ADVANCED_FACE]),
    (K::ClosedShell, &[SHELL]),
    (K::OpenShell, &[SHELL]),
    (K::ManifoldSolidBrep, &[MANIFOLD_SOLID_BREP]),
    (K::AdvancedBrepShapeRepresentation, &[ADVANCED_BREP_SHAPE_REPRESENTATION]),
    (K::ShapeRepresentation, &[SHAPE_REPRESENTATION]),
    (K::ShapeRepresentationRelationship, &[SHAPE_REPRESENTATION_RELATIONSHIP]),
    (K::ShapeDefinitionRepresentation, &[SHAPE_DEFINITION_REPRESENTATION]),
    (K::ApplicationContext, &[APPLICATION_CONTEXT]),
    (K::MechanicalContext, &[PRODUCT_CONTEXT]),
    (K::ProductContext, &[PRODUCT_CONTEXT]),
    (K::ProductDefinitionContext, &[PRODUCT_DEFINITION_CONTEXT]),
    (K::Product, &[PRODUCT]),
    (K::ProductType, &[PRODUCT_CATEGORY]),
    (K::ProductRelatedProductCategory, &[PRODUCT_CATEGORY]),
    (K::ProductDefinitionFormation, &[PRODUCT_DEFINITION_FORMATION]),
    (K::ProductDefinitionFormationWithSpecifiedSource, &[PRODUCT_DEFINITION_FORMATION_WITH_SOURCE]),
    (K::ProductDefinition, &[PRODUCT_DEFINITION]),
    (K::ProductDefinitionShape, &[PRODUCT_DEFINITION_SHAPE]),
];

/// Entity schema registry
#[derive(Clone)]
pub struct SchemaRegistry {
    entries: FxHashMap<EntityKind, EntitySchema>,
}

impl SchemaRegistry {
    /// Create the registry of all supported entity kinds
    pub fn new() -> Self {
        let mut registry = Self::empty();

        for (kind, variants) in SCHEMAS {
            registry.register(*kind, EntitySchema::Variants(variants));
        }

        for kind in [
            K::GeometricRepresentationContext,
            K::GlobalUnitAssignedContext,
            K::GlobalUncertaintyAssignedContext,
            K::RepresentationContext,
            K::ParametricRepresentationContext,
        ] {
            registry.register(kind, EntitySchema::Marker);
        }

        registry
    }

    /// Create a registry with no entries
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Register or replace the schema of a kind
    pub fn register(&mut self, kind: EntityKind, schema: EntitySchema) {
        self.entries.insert(kind, schema);
    }

    /// Look up the schema of a kind
    #[inline]
    pub fn get(&self, kind: EntityKind) -> Option<&EntitySchema> {
        self.entries.get(&kind)
    }

    #[inline]
    pub fn contains(&self, kind: EntityKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_brep_kinds() {
        let registry = SchemaRegistry::new();
        for kind in [
            K::Plane,
            K::AdvancedFace,
            K::FaceOuterBound,
            K::EdgeLoop,
            K::VertexLoop,
            K::OrientedEdge,
            K::EdgeCurve,
            K::SeamCurve,
            K::ToroidalSurface,
            K::SurfaceOfRevolution,
            K::ManifoldSolidBrep,
            K::Product,
        ] {
            assert!(registry.contains(kind), "{} missing", kind);
        }
        assert!(!registry.contains(K::Unknown));
    }

    #[test]
    fn test_variant_selection() {
        const SHORT: &[FieldSpec] = &[text("name")];
        const LONG: &[FieldSpec] = &[text("name"), float("radius")];
        const BOTH: &[&[FieldSpec]] = &[SHORT, LONG];

        let schema = EntitySchema::Variants(BOTH);
        assert_eq!(schema.variant_for(2).unwrap()[1].name, "radius");
        assert_eq!(schema.variant_for(1).unwrap().len(), 1);
        assert_eq!(schema.variant_for(3), Err(vec![1, 2]));
        assert_eq!(EntitySchema::Marker.variant_for(7).unwrap().len(), 0);
    }

    #[test]
    fn test_field_acceptance() {
        let registry = SchemaRegistry::new();
        let fields = registry.get(K::EdgeCurve).unwrap().variant_for(5).unwrap();
        assert!(fields[3].accepts_kind(K::SeamCurve));
        assert!(!fields[3].accepts_kind(K::Plane));
        assert!(fields[0].accepts_kind(K::Plane));

        let oriented = registry.get(K::OrientedEdge).unwrap().variant_for(5).unwrap();
        assert!(oriented[1].is_ignored());
    }
}

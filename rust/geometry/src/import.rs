// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP import driver
//!
//! Wires the resolver's lifecycle hooks to the mesh buffers:
//!
//! - VERTEX_POINT: push the vertex, stamp its buffer index
//! - EDGE_CURVE: push the edge; associate seam edges with their surfaces
//! - MANIFOLD_SOLID_BREP: reconstruct every face of the outer shell
//! - ADVANCED_BREP_SHAPE_REPRESENTATION: start a new object
//! - PRODUCT: record the object name
//!
//! Objects are found from SHAPE_DEFINITION_REPRESENTATION records, either
//! directly or through a SHAPE_REPRESENTATION_RELATIONSHIP. Shape
//! representations nothing points at are imported last, unnamed.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use stp_lite_core::{
    read_step, DiagnosticKind, Diagnostics, EntityId, EntityKind, HookContext, HookTable,
    InstanceGraph, InstanceHook, Param, Resolver, SchemaRegistry,
};

use crate::entities::FaceDef;
use crate::error::Result;
use crate::mesh::{MeshBuffers, MeshPayload, UNKNOWN_OBJECT};
use crate::router::FaceRouter;
use crate::transform::parse_cartesian_point;

/// Mutable state shared by the import hooks
#[derive(Debug, Default)]
pub struct ImportState {
    pub mesh: MeshBuffers,
    /// Name of the product currently being imported
    pub object_name: Option<String>,
    pub diagnostics: Diagnostics,
}

impl ImportState {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    /// Hand over the current object and start an empty one
    pub fn take_payload(&mut self) -> MeshPayload {
        let name = self
            .object_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_OBJECT.to_string());
        self.mesh.take_payload(name)
    }
}

impl HookContext for ImportState {
    fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}

struct VertexHook;

impl InstanceHook<ImportState> for VertexHook {
    fn supported_kinds(&self) -> Vec<EntityKind> {
        vec![EntityKind::VertexPoint]
    }

    fn on_first_load(&self, ctx: &mut ImportState, graph: &mut InstanceGraph, id: EntityId) {
        let Some(geometry) = graph.get(id).and_then(|v| v.get_ref("vertex_geometry")) else {
            tracing::debug!(vertex = id, "vertex without geometry");
            return;
        };
        match parse_cartesian_point(graph, geometry) {
            Ok(point) => {
                let index = ctx.mesh.push_vertex(point);
                graph.stamp_buffer_index(id, index);
            }
            Err(e) => ctx.diagnostics.report(e.diagnostic_kind(), Some(id), e.to_string()),
        }
    }
}

struct EdgeHook;

impl InstanceHook<ImportState> for EdgeHook {
    fn supported_kinds(&self) -> Vec<EntityKind> {
        vec![EntityKind::EdgeCurve]
    }

    fn on_first_load(&self, ctx: &mut ImportState, graph: &mut InstanceGraph, id: EntityId) {
        let Some(edge) = graph.get(id) else {
            return;
        };
        let index_of = |field: &str| {
            edge.get_ref(field)
                .and_then(|v| graph.get(v))
                .and_then(|v| v.buffer_index)
        };

        // Closed edges, e.g. full circles, have no straight segment to draw
        if let (Some(a), Some(b)) = (index_of("edge_start"), index_of("edge_end")) {
            if a != b {
                let index = ctx.mesh.push_edge(a, b);
                graph.stamp_buffer_index(id, index);
            }
        }
    }

    fn on_load(&self, _ctx: &mut ImportState, graph: &mut InstanceGraph, id: EntityId) {
        let Some(curve) = graph.field(id, "edge_geometry").and_then(|v| v.as_instance()) else {
            return;
        };
        if graph.kind(curve) != Some(EntityKind::SeamCurve) {
            return;
        }

        let surfaces: Vec<EntityId> = graph
            .field(curve, "associated_geometry")
            .map(|v| v.instance_ids())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|geometry| match graph.kind(geometry) {
                Some(EntityKind::Pcurve) => graph
                    .field(geometry, "basis_surface")
                    .and_then(|v| v.as_instance()),
                Some(kind) if kind.is_surface() => Some(geometry),
                _ => None,
            })
            .collect();

        for surface in surfaces {
            if graph.associate(surface, id) {
                tracing::trace!(edge = id, surface, "associated seam edge");
            }
        }
    }
}

struct SolidHook {
    router: FaceRouter,
}

impl InstanceHook<ImportState> for SolidHook {
    fn supported_kinds(&self) -> Vec<EntityKind> {
        vec![EntityKind::ManifoldSolidBrep]
    }

    fn on_first_load(&self, ctx: &mut ImportState, graph: &mut InstanceGraph, id: EntityId) {
        let faces = graph
            .field(id, "outer")
            .and_then(|v| v.as_instance())
            .and_then(|shell| graph.field(shell, "cfs_faces"))
            .map(|v| v.instance_ids())
            .unwrap_or_default();
        if faces.is_empty() {
            ctx.diagnostics
                .report(DiagnosticKind::SchemaMismatch, Some(id), "solid has no faces");
            return;
        }

        let mut built = 0;
        for face_id in &faces {
            let result = FaceDef::from_graph(graph, *face_id)
                .and_then(|face| self.router.process(&face, &mut ctx.mesh));
            match result {
                Ok(_) => built += 1,
                Err(e) => {
                    tracing::debug!(face = face_id, error = %e, "face skipped");
                    ctx.diagnostics
                        .report(e.diagnostic_kind(), Some(*face_id), e.to_string());
                }
            }
        }
        tracing::debug!(solid = id, faces = faces.len(), built, "reconstructed solid");
    }
}

struct ShapeHook;

impl InstanceHook<ImportState> for ShapeHook {
    fn supported_kinds(&self) -> Vec<EntityKind> {
        vec![EntityKind::AdvancedBrepShapeRepresentation]
    }

    fn on_init(&self, ctx: &mut ImportState, _graph: &mut InstanceGraph, id: EntityId) {
        tracing::trace!(shape = id, "starting object");
        ctx.mesh.reset();
    }
}

struct ProductHook;

impl InstanceHook<ImportState> for ProductHook {
    fn supported_kinds(&self) -> Vec<EntityKind> {
        vec![EntityKind::Product]
    }

    fn on_load(&self, ctx: &mut ImportState, graph: &mut InstanceGraph, id: EntityId) {
        let Some(product) = graph.get(id) else {
            return;
        };
        let name = product
            .get_str("name")
            .filter(|s| !s.is_empty())
            .or_else(|| product.get_str("id").filter(|s| !s.is_empty()));
        if let Some(name) = name {
            ctx.object_name = Some(name.to_string());
        }
    }
}

/// Objects and diagnostics produced by one import
#[derive(Debug, Default)]
pub struct ImportReport {
    pub objects: Vec<MeshPayload>,
    pub diagnostics: Diagnostics,
}

/// STEP importer
///
/// Holds the schema and hook table; each import builds a fresh instance
/// graph, so one importer can be reused across files.
pub struct StepImporter {
    schema: SchemaRegistry,
    hooks: HookTable<ImportState>,
}

impl StepImporter {
    pub fn new() -> Self {
        Self::with_router(FaceRouter::new())
    }

    /// Importer with a custom set of face processors
    pub fn with_router(router: FaceRouter) -> Self {
        let mut hooks: HookTable<ImportState> = HookTable::new();
        hooks.register(Arc::new(VertexHook));
        hooks.register(Arc::new(EdgeHook));
        hooks.register(Arc::new(SolidHook { router }));
        hooks.register(Arc::new(ShapeHook));
        hooks.register(Arc::new(ProductHook));

        Self {
            schema: SchemaRegistry::new(),
            hooks,
        }
    }

    /// Import STEP content held in memory
    pub fn import_str(&self, content: &str) -> Result<ImportReport> {
        self.import(content.as_bytes())
    }

    /// Import a STEP file from disk
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let file = std::fs::File::open(path.as_ref()).map_err(stp_lite_core::Error::from)?;
        self.import(std::io::BufReader::new(file))
    }

    /// Import a STEP stream
    ///
    /// Only a malformed envelope fails the import; problems inside the data
    /// section end up in the report's diagnostics.
    pub fn import<R: BufRead>(&self, reader: R) -> Result<ImportReport> {
        let file = read_step(reader)?;
        tracing::debug!(header = ?file.header, records = file.records.len(), "parsed STEP file");

        let mut graph = InstanceGraph::new(file.records);
        let mut state = ImportState::new(file.diagnostics);
        let resolver = Resolver::new(&self.schema, &self.hooks);

        for kind in [EntityKind::ProductType, EntityKind::ProductRelatedProductCategory] {
            for id in graph.ids_of_kind(kind) {
                resolver.resolve(&mut graph, &mut state, id);
                let category = graph.get(id).and_then(|c| c.get_str("name")).unwrap_or_default();
                if !is_part_category(category) {
                    tracing::warn!(id, category, "unknown product type");
                }
            }
        }

        let mut imported: FxHashSet<EntityId> = FxHashSet::default();
        let mut objects = Vec::new();

        for sdr in graph.ids_of_kind(EntityKind::ShapeDefinitionRepresentation) {
            state.object_name = None;
            resolver.resolve(&mut graph, &mut state, sdr);

            let Some(representation) = graph.field(sdr, "used_representation").and_then(|v| v.as_instance())
            else {
                continue;
            };
            let shapes = match graph.kind(representation) {
                Some(EntityKind::AdvancedBrepShapeRepresentation) => vec![representation],
                Some(EntityKind::ShapeRepresentation) => linked_shapes(&graph, representation),
                _ => Vec::new(),
            };

            for shape in shapes {
                if !imported.insert(shape) {
                    continue;
                }
                resolver.resolve(&mut graph, &mut state, shape);
                objects.push(finish_object(&mut state, shape));
            }
        }

        for shape in graph.ids_of_kind(EntityKind::AdvancedBrepShapeRepresentation) {
            if imported.insert(shape) {
                state.object_name = None;
                resolver.resolve(&mut graph, &mut state, shape);
                objects.push(finish_object(&mut state, shape));
            }
        }

        tracing::info!(
            objects = objects.len(),
            visited = graph.visited(),
            diagnostics = state.diagnostics.len(),
            "import finished"
        );
        Ok(ImportReport {
            objects,
            diagnostics: state.diagnostics,
        })
    }
}

impl Default for StepImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Only mechanical parts are expected; anything else is imported as is
fn is_part_category(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("part")
}

/// Advanced B-rep representations related to a shape representation
fn linked_shapes(graph: &InstanceGraph, representation: EntityId) -> Vec<EntityId> {
    let mut shapes = Vec::new();
    for relationship in graph.ids_of_kind(EntityKind::ShapeRepresentationRelationship) {
        let Some(record) = graph.record(relationship) else {
            continue;
        };
        let refs: Vec<EntityId> = record.params().iter().flat_map(Param::refs).collect();
        if !refs.contains(&representation) {
            continue;
        }
        shapes.extend(refs.into_iter().filter(|id| {
            graph.kind(*id) == Some(EntityKind::AdvancedBrepShapeRepresentation)
        }));
    }
    shapes
}

fn finish_object(state: &mut ImportState, shape: EntityId) -> MeshPayload {
    let payload = state.take_payload();
    tracing::info!(
        shape,
        object = %payload.object_name,
        vertices = payload.vertex_count(),
        edges = payload.edge_count(),
        faces = payload.face_count(),
        "imported object"
    );
    payload
}

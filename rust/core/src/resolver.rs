// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance graph resolver
//!
//! Depth-first, memoized resolution of `#N` references into the instance
//! arena. Children always resolve before their parent's `on_first_load`
//! hook runs. Every problem is reported as a diagnostic and resolution
//! carries on with whatever data could be recovered.

use crate::diagnostics::DiagnosticKind;
use crate::graph::{FieldMap, InstanceGraph, Referrer, ResolveState, ResolvedPart};
use crate::hooks::{HookContext, HookTable};
use crate::record::{EntityId, Param, RecordBody, SubRecord};
use crate::registry::{Coercion, FieldSpec, SchemaRegistry};
use crate::schema::EntityKind;
use crate::value::{typed_scalar, ResolvedValue, Scalar};

/// Schema-driven resolver over an [`InstanceGraph`]
pub struct Resolver<'a, C> {
    schema: &'a SchemaRegistry,
    hooks: &'a HookTable<C>,
}

impl<'a, C: HookContext> Resolver<'a, C> {
    pub fn new(schema: &'a SchemaRegistry, hooks: &'a HookTable<C>) -> Self {
        Self { schema, hooks }
    }

    /// Resolve a top-level instance
    ///
    /// Returns the id when the record exists, even if its type is unknown
    /// or some of its fields could not be resolved.
    pub fn resolve(&self, graph: &mut InstanceGraph, ctx: &mut C, id: EntityId) -> Option<EntityId> {
        self.visit(graph, ctx, id, None)
    }

    /// Resolve an instance on behalf of a referrer's field
    pub fn resolve_from(
        &self,
        graph: &mut InstanceGraph,
        ctx: &mut C,
        id: EntityId,
        referrer: Referrer,
    ) -> Option<EntityId> {
        self.visit(graph, ctx, id, Some(referrer))
    }

    fn visit(
        &self,
        graph: &mut InstanceGraph,
        ctx: &mut C,
        id: EntityId,
        referrer: Option<Referrer>,
    ) -> Option<EntityId> {
        let Some(raw) = graph.record(id).cloned() else {
            let message = match referrer {
                Some(r) => format!("reference to missing record from #{}.{}", r.id, r.field),
                None => "reference to missing record".to_string(),
            };
            ctx.diagnostics()
                .report(DiagnosticKind::SchemaMismatch, Some(id), message);
            return None;
        };

        let instance = graph.entry(&raw)?;
        if let Some(r) = referrer {
            instance.add_back_ref(r);
        }
        let kind = instance.kind;

        match instance.state {
            ResolveState::Resolved => {
                if let Some(hook) = self.hooks.get(kind) {
                    hook.on_load(ctx, graph, id);
                }
                return Some(id);
            }
            ResolveState::InProgress => {
                tracing::debug!(id, kind = %kind, "instance re-entered while resolving");
                return Some(id);
            }
            ResolveState::Pending => instance.state = ResolveState::InProgress,
        }

        match &raw.body {
            RecordBody::Complex(parts) => {
                let resolved: Vec<ResolvedPart> = parts
                    .iter()
                    .map(|part| self.resolve_part(graph, ctx, id, part))
                    .collect();
                if let Some(instance) = graph.get_mut(id) {
                    instance.parts = resolved;
                    instance.state = ResolveState::Resolved;
                }
            }
            RecordBody::Simple(sub) => {
                let Some(fields) = self.select_fields(ctx, id, kind, sub) else {
                    if let Some(instance) = graph.get_mut(id) {
                        instance.state = ResolveState::Resolved;
                    }
                    return Some(id);
                };

                let hook = self.hooks.get(kind);
                if let Some(hook) = hook {
                    hook.on_init(ctx, graph, id);
                }

                let data = self.resolve_fields(graph, ctx, id, fields, &sub.params);
                if let Some(instance) = graph.get_mut(id) {
                    instance.data = data;
                    instance.state = ResolveState::Resolved;
                }

                if let Some(hook) = hook {
                    hook.on_first_load(ctx, graph, id);
                    hook.on_load(ctx, graph, id);
                }
            }
        }

        Some(id)
    }

    /// Pick the schema variant matching the parameter count
    fn select_fields(
        &self,
        ctx: &mut C,
        id: EntityId,
        kind: EntityKind,
        sub: &SubRecord,
    ) -> Option<&'static [FieldSpec]> {
        let Some(schema) = self.schema.get(kind) else {
            ctx.diagnostics().report(
                DiagnosticKind::SchemaMismatch,
                Some(id),
                format!("undefined instance of type {}", sub.type_name),
            );
            return None;
        };

        match schema.variant_for(sub.params.len()) {
            Ok(fields) => Some(fields),
            Err(expected) => {
                ctx.diagnostics().report(
                    DiagnosticKind::SchemaMismatch,
                    Some(id),
                    format!(
                        "{} expects {:?} parameters, found {}",
                        sub.type_name,
                        expected,
                        sub.params.len()
                    ),
                );
                None
            }
        }
    }

    fn resolve_part(
        &self,
        graph: &mut InstanceGraph,
        ctx: &mut C,
        id: EntityId,
        part: &SubRecord,
    ) -> ResolvedPart {
        let kind = EntityKind::from_name(&part.type_name);
        let data = match self.select_fields(ctx, id, kind, part) {
            Some(fields) => self.resolve_fields(graph, ctx, id, fields, &part.params),
            None => FieldMap::default(),
        };
        ResolvedPart {
            kind,
            type_name: part.type_name.clone(),
            data,
        }
    }

    fn resolve_fields(
        &self,
        graph: &mut InstanceGraph,
        ctx: &mut C,
        owner: EntityId,
        fields: &'static [FieldSpec],
        params: &[Param],
    ) -> FieldMap {
        let mut data = FieldMap::default();
        for (spec, param) in fields.iter().zip(params) {
            if spec.is_ignored() {
                continue;
            }
            if let Some(value) = self.resolve_param(graph, ctx, owner, spec, spec.coercion, param) {
                data.insert(spec.name, value);
            }
        }
        data
    }

    fn resolve_param(
        &self,
        graph: &mut InstanceGraph,
        ctx: &mut C,
        owner: EntityId,
        spec: &FieldSpec,
        coercion: Coercion,
        param: &Param,
    ) -> Option<ResolvedValue> {
        match param {
            Param::Ref(child) => {
                let child = self.visit(graph, ctx, *child, Some(Referrer::new(owner, spec.name)))?;
                let accepted = spec.accepts.is_empty()
                    || graph
                        .get(child)
                        .is_some_and(|c| spec.accepts.iter().any(|k| c.is_kind(*k)));
                if !accepted {
                    let found = graph
                        .get(child)
                        .map(|c| c.type_name.clone())
                        .unwrap_or_default();
                    ctx.diagnostics().report(
                        DiagnosticKind::SchemaMismatch,
                        Some(owner),
                        format!(
                            "field '{}' expects one of {:?}, found #{} {}",
                            spec.name, spec.accepts, child, found
                        ),
                    );
                    return None;
                }
                Some(ResolvedValue::Instance(child))
            }
            Param::List(items) => {
                let element = match coercion {
                    Coercion::Multiple(inner) => *inner,
                    other => other,
                };
                let values = items
                    .iter()
                    .filter_map(|item| self.resolve_param(graph, ctx, owner, spec, element, item))
                    .collect();
                Some(ResolvedValue::List(values))
            }
            Param::Scalar(text) => match Scalar::coerce(text, coercion) {
                Some(scalar) if !spec.accepts.is_empty() && !scalar.is_omitted() => {
                    ctx.diagnostics().report(
                        DiagnosticKind::SchemaMismatch,
                        Some(owner),
                        format!("field '{}' expects a reference, found '{}'", spec.name, text),
                    );
                    None
                }
                Some(scalar) => Some(ResolvedValue::Scalar(scalar)),
                None => {
                    ctx.diagnostics().report(
                        DiagnosticKind::SchemaMismatch,
                        Some(owner),
                        format!("field '{}' cannot coerce '{}' to {:?}", spec.name, text, coercion),
                    );
                    None
                }
            },
            Param::Typed { name, params } => Some(ResolvedValue::Scalar(typed_scalar(name, params))),
        }
    }
}

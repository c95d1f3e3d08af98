// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instance graph arena
//!
//! Resolved instances live in a map keyed by entity id, created on first
//! visit. References between instances are ids, so shared children and
//! cycles need no ownership bookkeeping.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::record::{EntityId, RawRecord, RecordBody, RecordTable};
use crate::schema::EntityKind;
use crate::value::ResolvedValue;

/// Field name to resolved value
pub type FieldMap = FxHashMap<&'static str, ResolvedValue>;

/// A parent that references an instance through one of its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Referrer {
    pub id: EntityId,
    pub field: &'static str,
}

impl Referrer {
    pub fn new(id: EntityId, field: &'static str) -> Self {
        Self { id, field }
    }
}

/// Resolution progress of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveState {
    #[default]
    Pending,
    /// Children are being resolved; re-entry means a cycle
    InProgress,
    Resolved,
}

/// One resolved sub-record of an anonymous wrapper
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPart {
    pub kind: EntityKind,
    pub type_name: String,
    pub data: FieldMap,
}

/// A record after resolution
#[derive(Debug, Clone)]
pub struct ResolvedInstance {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Type name as written; empty for a wrapper
    pub type_name: String,
    /// The source record, shared read-only
    pub raw: Arc<RawRecord>,
    pub state: ResolveState,
    /// Resolved fields. Populated once on the first visit.
    pub data: FieldMap,
    /// Sub-records of an anonymous wrapper
    pub parts: Vec<ResolvedPart>,
    /// Every distinct (referrer, field) that reached this instance
    pub back_refs: SmallVec<[Referrer; 2]>,
    /// Mesh buffer index stamped by a load hook (vertex or edge)
    pub buffer_index: Option<u32>,
    /// Instances associated by load hooks, e.g. seam edges of a surface
    pub associated: SmallVec<[EntityId; 2]>,
}

impl ResolvedInstance {
    fn new(raw: Arc<RawRecord>) -> Self {
        let (kind, type_name) = match &raw.body {
            RecordBody::Simple(sub) => (EntityKind::from_name(&sub.type_name), sub.type_name.clone()),
            RecordBody::Complex(_) => (EntityKind::Unknown, String::new()),
        };
        Self {
            id: raw.id,
            kind,
            type_name,
            raw,
            state: ResolveState::Pending,
            data: FieldMap::default(),
            parts: Vec::new(),
            back_refs: SmallVec::new(),
            buffer_index: None,
            associated: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.state == ResolveState::Resolved
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        self.raw.is_complex()
    }

    /// Get a resolved field
    #[inline]
    pub fn get(&self, field: &str) -> Option<&ResolvedValue> {
        self.data.get(field)
    }

    /// Get a field holding a single instance reference
    #[inline]
    pub fn get_ref(&self, field: &str) -> Option<EntityId> {
        self.get(field)?.as_instance()
    }

    #[inline]
    pub fn get_float(&self, field: &str) -> Option<f64> {
        self.get(field)?.as_float()
    }

    #[inline]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_str()
    }

    #[inline]
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field)?.as_bool()
    }

    /// Instance ids of a list field (or a single reference)
    pub fn get_refs(&self, field: &str) -> Vec<EntityId> {
        self.get(field)
            .map(ResolvedValue::instance_ids)
            .unwrap_or_default()
    }

    /// Whether this instance is, or for a wrapper contains, the given kind
    pub fn is_kind(&self, kind: EntityKind) -> bool {
        self.kind == kind || self.parts.iter().any(|p| p.kind == kind)
    }

    /// Record a referrer unless it is already known. Returns true if new.
    pub fn add_back_ref(&mut self, referrer: Referrer) -> bool {
        if self.back_refs.contains(&referrer) {
            return false;
        }
        self.back_refs.push(referrer);
        true
    }
}

/// Arena of resolved instances over a record table
pub struct InstanceGraph {
    records: RecordTable,
    instances: FxHashMap<EntityId, ResolvedInstance>,
}

impl InstanceGraph {
    pub fn new(records: RecordTable) -> Self {
        Self {
            records,
            instances: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn records(&self) -> &RecordTable {
        &self.records
    }

    #[inline]
    pub fn record(&self, id: EntityId) -> Option<&Arc<RawRecord>> {
        self.records.get(id)
    }

    /// Get an instance that has been visited by the resolver
    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&ResolvedInstance> {
        self.instances.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut ResolvedInstance> {
        self.instances.get_mut(&id)
    }

    /// Kind of an instance, from the record if it has not been visited yet
    pub fn kind(&self, id: EntityId) -> Option<EntityKind> {
        if let Some(instance) = self.get(id) {
            return Some(instance.kind);
        }
        self.record(id)
            .and_then(|r| r.type_name())
            .map(EntityKind::from_name)
    }

    /// Get a resolved field of an instance
    #[inline]
    pub fn field(&self, id: EntityId, field: &str) -> Option<&ResolvedValue> {
        self.get(id)?.get(field)
    }

    /// Ids of all records of a kind, in id order
    pub fn ids_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.records.ids_of_type(kind.as_str())
    }

    /// Fetch the instance slot for a record, creating it on first visit
    pub(crate) fn entry(&mut self, raw: &Arc<RawRecord>) -> Option<&mut ResolvedInstance> {
        if !self.records.contains(raw.id) {
            return None;
        }
        Some(
            self.instances
                .entry(raw.id)
                .or_insert_with(|| ResolvedInstance::new(Arc::clone(raw))),
        )
    }

    /// Stamp a mesh buffer index onto an instance
    pub fn stamp_buffer_index(&mut self, id: EntityId, index: u32) {
        if let Some(instance) = self.get_mut(id) {
            instance.buffer_index = Some(index);
        }
    }

    /// Associate `other` with `target`. Returns true if the association is new.
    pub fn associate(&mut self, target: EntityId, other: EntityId) -> bool {
        match self.get_mut(target) {
            Some(instance) if !instance.associated.contains(&other) => {
                instance.associated.push(other);
                true
            }
            _ => false,
        }
    }

    /// Number of instances visited so far
    pub fn visited(&self) -> usize {
        self.instances.len()
    }
}

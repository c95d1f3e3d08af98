// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw records and the id-addressable record table

use std::collections::BTreeMap;
use std::sync::Arc;

/// Instance number taken from a `#N` token
pub type EntityId = u32;

/// One parameter of a raw record, before schema coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Entity reference: #123
    Ref(EntityId),
    /// Any other token kept verbatim: numbers, 'strings', .ENUMS., $ and *
    Scalar(String),
    /// Nested list: (1.5, -2.0, 0.0)
    List(Vec<Param>),
    /// Typed value: POSITIVE_LENGTH_MEASURE(0.1)
    Typed { name: String, params: Vec<Param> },
}

impl Param {
    /// Create a scalar parameter from token text
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    #[inline]
    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Param]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is the `$` marker
    #[inline]
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Scalar(text) if text == "$")
    }

    /// Entity ids referenced by this parameter, including nested lists
    pub fn refs(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs(&self, out: &mut Vec<EntityId>) {
        match self {
            Self::Ref(id) => out.push(*id),
            Self::List(items) | Self::Typed { params: items, .. } => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            Self::Scalar(_) => {}
        }
    }
}

/// A type name with its parameter list
#[derive(Debug, Clone, PartialEq)]
pub struct SubRecord {
    pub type_name: String,
    pub params: Vec<Param>,
}

/// Body of a record: one typed entity or an anonymous multi-entity wrapper
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    /// `#id = TYPE(params)`
    Simple(SubRecord),
    /// `#id = (TYPE1(...) TYPE2(...))`
    Complex(Vec<SubRecord>),
}

/// A parsed DATA statement. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: EntityId,
    pub body: RecordBody,
}

impl RawRecord {
    pub fn simple(id: EntityId, type_name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            id,
            body: RecordBody::Simple(SubRecord {
                type_name: type_name.into(),
                params,
            }),
        }
    }

    /// Type name of a simple record; `None` for a wrapper
    pub fn type_name(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Simple(sub) => Some(&sub.type_name),
            RecordBody::Complex(_) => None,
        }
    }

    /// Parameters of a simple record; empty for a wrapper
    pub fn params(&self) -> &[Param] {
        match &self.body {
            RecordBody::Simple(sub) => &sub.params,
            RecordBody::Complex(_) => &[],
        }
    }

    /// Sub-records of a wrapper; empty for a simple record
    pub fn parts(&self) -> &[SubRecord] {
        match &self.body {
            RecordBody::Simple(_) => &[],
            RecordBody::Complex(parts) => parts,
        }
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self.body, RecordBody::Complex(_))
    }
}

/// Ids this far past twice the record count go to the sparse map
const DENSE_HEADROOM: usize = 4096;

/// Record table indexed by entity id
///
/// STEP numbering need not start at 1 or be contiguous, so unused slots
/// stay empty. The dense slots only grow in proportion to the number of
/// records; outlying ids live in an ordered map, all above the dense range.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    slots: Vec<Option<Arc<RawRecord>>>,
    sparse: BTreeMap<EntityId, Arc<RawRecord>>,
    count: usize,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns the record back if its id is already taken;
    /// the first definition wins.
    pub fn insert(&mut self, record: RawRecord) -> std::result::Result<(), RawRecord> {
        if self.contains(record.id) {
            return Err(record);
        }

        let idx = record.id as usize;
        if idx >= self.slots.len() && idx <= self.count * 2 + DENSE_HEADROOM {
            self.grow(idx + 1);
        }
        match self.slots.get_mut(idx) {
            Some(slot) => *slot = Some(Arc::new(record)),
            None => {
                self.sparse.insert(record.id, Arc::new(record));
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Extend the dense slots, pulling in sparse records that now fit
    fn grow(&mut self, len: usize) {
        self.slots.resize_with(len, || None);
        let rest = self.sparse.split_off(&(len as EntityId));
        for (id, record) in std::mem::replace(&mut self.sparse, rest) {
            self.slots[id as usize] = Some(record);
        }
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Arc<RawRecord>> {
        match self.slots.get(id as usize) {
            Some(slot) => slot.as_ref(),
            None => self.sparse.get(&id),
        }
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Number of records present
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of dense slots
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Records in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RawRecord>> {
        self.slots.iter().flatten().chain(self.sparse.values())
    }

    /// Ids of simple records with the given type name, in id order
    pub fn ids_of_type(&self, type_name: &str) -> Vec<EntityId> {
        self.iter()
            .filter(|r| {
                r.type_name()
                    .is_some_and(|t| t.eq_ignore_ascii_case(type_name))
            })
            .map(|r| r.id)
            .collect()
    }
}

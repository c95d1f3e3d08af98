// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal import diagnostics
//!
//! Everything short of a missing section marker is reported here and the
//! import carries on with a best-effort partial result.

use std::fmt;

use crate::record::EntityId;

/// Category of a non-fatal problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DiagnosticKind {
    /// Malformed statement or parameter list
    Parse,
    /// Unknown type, arity mismatch, or a reference outside the accepted types
    SchemaMismatch,
    /// Open or unclosed edge/segment loop
    LoopIntegrity,
    /// No reconstruction rule for a surface/bound combination
    UnsupportedSurface,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parse => "parse",
            Self::SchemaMismatch => "schema mismatch",
            Self::LoopIntegrity => "loop integrity",
            Self::UnsupportedSurface => "unsupported surface",
        };
        f.write_str(name)
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Entity the problem was found on, if any
    pub entity: Option<EntityId>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity {
            Some(id) => write!(f, "[{}] #{}: {}", self.kind, id, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Ordered collection of diagnostics for one import
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a warning event
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        entity: Option<EntityId>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            entity,
            message: message.into(),
        };
        tracing::warn!(kind = %diagnostic.kind, entity = ?diagnostic.entity, "{}", diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics of one kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Diagnostics attached to one entity
    pub fn for_entity(&self, id: EntityId) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.entity == Some(id))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

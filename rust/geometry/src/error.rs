// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use stp_lite_core::{DiagnosticKind, EntityId};
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconstructing a face
#[derive(Error, Debug)]
pub enum Error {
    /// Open or unclosed edge/segment loop
    #[error("Loop integrity: {0}")]
    LoopIntegrity(String),

    /// No reconstruction rule matches the surface/bound combination
    #[error("Unsupported surface: {0}")]
    UnsupportedSurface(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("#{entity} has no usable '{field}'")]
    MissingField { entity: EntityId, field: &'static str },

    #[error("Core parser error: {0}")]
    Core(#[from] stp_lite_core::Error),
}

impl Error {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub fn loop_integrity(msg: impl Into<String>) -> Self {
        Self::LoopIntegrity(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedSurface(msg.into())
    }

    pub fn missing(entity: EntityId, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }

    /// Diagnostic category this error is reported under
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            Self::LoopIntegrity(_) => DiagnosticKind::LoopIntegrity,
            Self::UnsupportedSurface(_) | Self::InvalidGeometry(_) => {
                DiagnosticKind::UnsupportedSurface
            }
            Self::MissingField { .. } => DiagnosticKind::SchemaMismatch,
            Self::Core(_) => DiagnosticKind::Parse,
        }
    }
}

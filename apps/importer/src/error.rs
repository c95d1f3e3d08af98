// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the importer binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Usage: stp-import <file.stp>")]
    MissingPath,

    #[error("Unknown output format '{0}', expected 'summary' or 'json'")]
    InvalidOutput(String),

    #[error("Import failed: {0}")]
    Import(#[from] stp_lite_geometry::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

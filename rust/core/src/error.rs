// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for STEP reading
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or parsing a STEP file
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A top-level section marker is missing or out of order. Fatal.
    #[error("Expected section marker '{expected}', found '{found}'")]
    MissingSection { expected: &'static str, found: String },

    /// The input ended inside a section. Fatal.
    #[error("Unexpected end of input inside {section} section")]
    UnexpectedEof { section: &'static str },

    #[error("Parse error: {message} in statement '{statement}'")]
    Parse { message: String, statement: String },

    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),
}

impl Error {
    /// Create a parse error for a statement, truncating long statements
    pub fn parse(statement: &str, message: impl Into<String>) -> Self {
        const PREVIEW: usize = 80;
        let statement = match statement.char_indices().nth(PREVIEW) {
            Some((idx, _)) => format!("{}...", &statement[..idx]),
            None => statement.to_string(),
        };
        Self::Parse {
            message: message.into(),
            statement,
        }
    }

    /// Create a missing-section error
    pub fn missing_section(expected: &'static str, found: Option<&str>) -> Self {
        Self::MissingSection {
            expected,
            found: found.unwrap_or("<end of input>").to_string(),
        }
    }

    /// Whether this error aborts a whole import
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::MissingSection { .. } | Self::UnexpectedEof { .. }
        )
    }
}

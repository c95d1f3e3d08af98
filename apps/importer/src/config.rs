// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Importer configuration loaded from environment variables.

use std::str::FromStr;

use crate::error::ImportError;

/// What gets written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per object plus the diagnostics.
    Summary,
    /// Full payloads and diagnostics as JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            _ => Err(ImportError::InvalidOutput(s.to_string())),
        }
    }
}

/// Importer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log filter directive.
    pub log_filter: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
    pub output: OutputFormat,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// An unknown `STP_OUTPUT` is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ImportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ImportError> {
        Ok(Self {
            log_filter: var("STP_LOG").unwrap_or_else(|| "info".into()),
            log_json: var("STP_LOG_JSON")
                .unwrap_or_else(|| "false".into())
                .parse()
                .unwrap_or(false),
            output: var("STP_OUTPUT")
                .unwrap_or_else(|| "summary".into())
                .parse()?,
            pretty: var("STP_PRETTY")
                .unwrap_or_else(|| "false".into())
                .parse()
                .unwrap_or(false),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            log_json: false,
            output: OutputFormat::Summary,
            pretty: false,
        }
    }
}

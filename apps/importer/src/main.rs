// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STP-Lite Importer - reads one STEP file and prints its solids.
//!
//! ```text
//! stp-import part.stp
//! STP_OUTPUT=json STP_PRETTY=true stp-import part.stp > part.json
//! ```
//!
//! Environment:
//!
//! - `STP_LOG` - log filter directive (default `info`)
//! - `STP_LOG_JSON` - emit logs as JSON lines
//! - `STP_OUTPUT` - `summary` (default) or `json`; anything else is an error
//! - `STP_PRETTY` - pretty-print JSON output
//!
//! Logs go to stderr, so JSON output on stdout stays clean. Only a malformed
//! file envelope or an unreadable file gives a non-zero exit code.

use std::io::Write;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use stp_lite_core::{Diagnostic, Diagnostics};
use stp_lite_geometry::{ImportReport, MeshPayload, StepImporter};

mod config;
mod error;

use config::{Config, OutputFormat};
use error::ImportError;

/// JSON document written for `STP_OUTPUT=json`.
#[derive(Serialize)]
struct Output<'a> {
    objects: &'a [MeshPayload],
    diagnostics: &'a Diagnostics,
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(&config);

    let path = std::env::args().nth(1).ok_or(ImportError::MissingPath)?;

    tracing::info!(path = %path, output = ?config.output, "importing");
    let start = Instant::now();

    let report = StepImporter::new()
        .import_file(&path)
        .map_err(ImportError::from)
        .with_context(|| format!("failed to import {}", path))?;

    tracing::info!(
        objects = report.objects.len(),
        diagnostics = report.diagnostics.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match config.output {
        OutputFormat::Summary => write_summary(&mut out, &report)?,
        OutputFormat::Json => write_json(&mut out, &report, config.pretty)?,
    }
    out.flush().map_err(ImportError::from)?;
    Ok(())
}

fn init_logging(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn write_summary(out: &mut impl Write, report: &ImportReport) -> Result<(), ImportError> {
    for object in &report.objects {
        writeln!(
            out,
            "{}: {} vertices, {} edges, {} faces",
            object.object_name,
            object.vertex_count(),
            object.edge_count(),
            object.face_count()
        )?;
    }
    if !report.diagnostics.is_empty() {
        writeln!(out, "{} diagnostics:", report.diagnostics.len())?;
        for diagnostic in report.diagnostics.iter() {
            write_diagnostic(out, diagnostic)?;
        }
    }
    Ok(())
}

fn write_diagnostic(out: &mut impl Write, diagnostic: &Diagnostic) -> Result<(), ImportError> {
    writeln!(out, "  {}", diagnostic)?;
    Ok(())
}

fn write_json(out: &mut impl Write, report: &ImportReport, pretty: bool) -> Result<(), ImportError> {
    let output = Output {
        objects: &report.objects,
        diagnostics: &report.diagnostics,
    };
    if pretty {
        serde_json::to_writer_pretty(&mut *out, &output)?;
    } else {
        serde_json::to_writer(&mut *out, &output)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stp_lite_core::DiagnosticKind;

    fn report() -> ImportReport {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::LoopIntegrity, Some(12), "open loop");
        ImportReport {
            objects: vec![MeshPayload {
                object_name: "Cube".into(),
                vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
                edges: vec![[0, 1]],
                faces: vec![vec![0, 1, 2]],
            }],
            diagnostics,
        }
    }

    #[test]
    fn test_summary_lists_objects_and_diagnostics() {
        let mut buf = Vec::new();
        write_summary(&mut buf, &report()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Cube: 3 vertices, 1 edges, 1 faces"));
        assert!(text.contains("1 diagnostics:"));
        assert!(text.contains("#12: open loop"));
    }

    #[test]
    fn test_json_output_shape() {
        let mut buf = Vec::new();
        write_json(&mut buf, &report(), false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["objects"][0]["object_name"], "Cube");
        assert_eq!(value["objects"][0]["faces"][0], serde_json::json!([0, 1, 2]));
        assert_eq!(value["diagnostics"][0]["kind"], "LoopIntegrity");
        assert_eq!(value["diagnostics"][0]["entity"], 12);
    }
}

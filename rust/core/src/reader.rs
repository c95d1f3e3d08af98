// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section reader
//!
//! Walks the top-level structure of an ISO-10303-21 stream and fills the
//! record table from the DATA section. Missing section markers abort the
//! read; malformed DATA statements are reported and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};
use crate::lines::LineAssembler;
use crate::parser::{parse_record, statement_keyword};
use crate::record::RecordTable;

const MAGIC: &str = "ISO-10303-21";
const END_MAGIC: &str = "END-ISO-10303-21";

/// Parsed contents of a STEP file
#[derive(Debug, Default)]
pub struct StepFile {
    /// Type names of the HEADER entries, e.g. FILE_NAME
    pub header: Vec<String>,
    pub records: RecordTable,
    /// Statement-level problems found while reading
    pub diagnostics: Diagnostics,
}

/// Read a STEP stream
pub fn read_step<R: BufRead>(reader: R) -> Result<StepFile> {
    let mut lines = LineAssembler::new(reader);
    let mut file = StepFile::default();

    expect(&mut lines, MAGIC)?;
    expect(&mut lines, "HEADER")?;

    loop {
        match lines.next() {
            Some(Ok(statement)) if statement == "ENDSEC" => break,
            Some(Ok(statement)) => {
                let name = statement_keyword(&statement).unwrap_or_default();
                tracing::debug!(entry = name, "skipping header entry");
                file.header.push(name.to_string());
            }
            Some(Err(e)) if !e.is_fatal() => {
                return Err(Error::UnexpectedEof { section: "HEADER" });
            }
            Some(Err(e)) => return Err(e),
            None => return Err(Error::UnexpectedEof { section: "HEADER" }),
        }
    }

    expect(&mut lines, "DATA")?;
    read_data(&mut lines, &mut file)?;

    // Later DATA sections are appended to the same table
    loop {
        match lines.next() {
            Some(Ok(statement)) if statement == "DATA" => read_data(&mut lines, &mut file)?,
            Some(Ok(statement)) if statement == END_MAGIC => break,
            Some(Ok(statement)) => {
                file.diagnostics.report(
                    DiagnosticKind::Parse,
                    None,
                    format!("unexpected statement after DATA section: '{}'", statement),
                );
            }
            Some(Err(e)) if e.is_fatal() => return Err(e),
            Some(Err(e)) => file.diagnostics.report(DiagnosticKind::Parse, None, e.to_string()),
            None => {
                file.diagnostics.report(
                    DiagnosticKind::Parse,
                    None,
                    format!("missing {} terminator", END_MAGIC),
                );
                break;
            }
        }
    }

    tracing::debug!(
        records = file.records.len(),
        lines = lines.line_number(),
        "read STEP data"
    );
    Ok(file)
}

/// Read STEP content held in memory
pub fn read_step_str(content: &str) -> Result<StepFile> {
    read_step(content.as_bytes())
}

/// Read a STEP file from disk
pub fn read_step_file(path: impl AsRef<Path>) -> Result<StepFile> {
    let file = File::open(path)?;
    read_step(BufReader::new(file))
}

fn expect<R: BufRead>(lines: &mut LineAssembler<R>, marker: &'static str) -> Result<()> {
    match lines.next() {
        Some(Ok(statement)) if statement == marker => Ok(()),
        Some(Ok(statement)) => Err(Error::missing_section(marker, Some(&statement))),
        Some(Err(e)) if e.is_fatal() => Err(e),
        Some(Err(_)) | None => Err(Error::missing_section(marker, None)),
    }
}

/// Read DATA statements up to ENDSEC
fn read_data<R: BufRead>(lines: &mut LineAssembler<R>, file: &mut StepFile) -> Result<()> {
    loop {
        let statement = match lines.next() {
            Some(Ok(statement)) => statement,
            Some(Err(e)) if e.is_fatal() => return Err(e),
            // A trailing statement without ';' means ENDSEC never came
            Some(Err(_)) | None => return Err(Error::UnexpectedEof { section: "DATA" }),
        };
        if statement == "ENDSEC" {
            return Ok(());
        }

        match parse_record(&statement) {
            Ok(record) => {
                if let Err(duplicate) = file.records.insert(record) {
                    file.diagnostics.report(
                        DiagnosticKind::Parse,
                        Some(duplicate.id),
                        "duplicate instance number, keeping the first definition",
                    );
                }
            }
            Err(e) => file.diagnostics.report(DiagnosticKind::Parse, None, e.to_string()),
        }
    }
}

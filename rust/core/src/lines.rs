// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line assembler
//!
//! Groups physical lines into logical `;`-terminated statements. Physical
//! lines are trimmed and concatenated. A `;` inside a string literal does
//! not end a statement, and `/* ... */` comments are dropped.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::error::{Error, Result};

/// Iterator over the logical statements of a STEP stream
///
/// Statements are yielded without their terminating `;`. Trailing text
/// without a terminator is yielded last as a parse error.
pub struct LineAssembler<R> {
    reader: R,
    line: Vec<u8>,
    pending: String,
    ready: VecDeque<String>,
    in_string: bool,
    in_comment: bool,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> LineAssembler<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending: String::new(),
            ready: VecDeque::new(),
            in_string: false,
            in_comment: false,
            line_number: 0,
            finished: false,
        }
    }

    /// Number of physical lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next physical line. Returns false at end of input.
    fn fill(&mut self) -> Result<bool> {
        self.line.clear();
        let read = self.reader.read_until(b'\n', &mut self.line)?;
        if read == 0 {
            return Ok(false);
        }
        self.line_number += 1;

        let text = String::from_utf8_lossy(&self.line).trim().to_string();
        // A line break inside a string literal reads as one space
        if self.in_string && !self.pending.ends_with(' ') {
            self.pending.push(' ');
        }
        self.split_statements(&text);
        Ok(true)
    }

    /// Append a trimmed physical line, cutting statements at each `;`
    fn split_statements(&mut self, mut text: &str) {
        while !text.is_empty() {
            if self.in_comment {
                match text.find("*/") {
                    Some(end) => {
                        self.in_comment = false;
                        text = &text[end + 2..];
                        continue;
                    }
                    None => return,
                }
            }

            let bytes = text.as_bytes();
            let Some(pos) = memchr::memchr3(b';', b'\'', b'/', bytes) else {
                self.pending.push_str(text);
                return;
            };

            match bytes[pos] {
                b'\'' => {
                    self.in_string = !self.in_string;
                    self.pending.push_str(&text[..=pos]);
                    text = &text[pos + 1..];
                }
                _ if self.in_string => {
                    self.pending.push_str(&text[..=pos]);
                    text = &text[pos + 1..];
                }
                b';' => {
                    self.pending.push_str(&text[..pos]);
                    let statement = std::mem::take(&mut self.pending);
                    let statement = statement.trim();
                    if !statement.is_empty() {
                        self.ready.push_back(statement.to_string());
                    }
                    text = &text[pos + 1..];
                }
                _ if bytes.get(pos + 1) == Some(&b'*') => {
                    self.pending.push_str(&text[..pos]);
                    self.in_comment = true;
                    text = &text[pos + 2..];
                }
                _ => {
                    self.pending.push_str(&text[..=pos]);
                    text = &text[pos + 1..];
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for LineAssembler<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(statement) = self.ready.pop_front() {
                return Some(Ok(statement));
            }
            if self.finished {
                return None;
            }
            match self.fill() {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    let rest = std::mem::take(&mut self.pending);
                    let rest = rest.trim();
                    if !rest.is_empty() {
                        return Some(Err(Error::parse(rest, "statement is missing ';'")));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

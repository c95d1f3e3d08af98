// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # STP-Lite Core
//!
//! ISO-10303-21 (STEP) reader built with [nom](https://docs.rs/nom), plus a
//! schema-driven, memoized resolver that turns the raw record table into an
//! instance graph.
//!
//! ## Overview
//!
//! - **Line assembly**: physical lines grouped into `;`-terminated statements
//! - **Record parsing**: `#id = TYPE(params)` and anonymous multi-entity wrappers
//! - **Schema registry**: positional field tables for the B-rep entity subset
//! - **Resolution**: depth-first, cycle-tolerant, with lifecycle hooks and
//!   back-references for shared instances
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stp_lite_core::{read_step_str, Diagnostics, HookTable, InstanceGraph, Resolver, SchemaRegistry};
//!
//! let file = read_step_str(content)?;
//! let mut graph = InstanceGraph::new(file.records);
//! let schema = SchemaRegistry::new();
//! let hooks = HookTable::new();
//! let mut diagnostics = file.diagnostics;
//!
//! let resolver = Resolver::new(&schema, &hooks);
//! resolver.resolve(&mut graph, &mut diagnostics, 10);
//! let coords = graph.field(10, "coordinates").map(|v| v.floats());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of diagnostics

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod hooks;
pub mod lines;
pub mod parser;
pub mod reader;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use graph::{FieldMap, InstanceGraph, Referrer, ResolveState, ResolvedInstance, ResolvedPart};
pub use hooks::{HookContext, HookTable, InstanceHook};
pub use lines::LineAssembler;
pub use parser::parse_record;
pub use reader::{read_step, read_step_file, read_step_str, StepFile};
pub use record::{EntityId, Param, RawRecord, RecordBody, RecordTable, SubRecord};
pub use registry::{Coercion, EntitySchema, FieldSpec, SchemaRegistry};
pub use resolver::Resolver;
pub use schema::EntityKind;
pub use value::{parse_float, ResolvedValue, Scalar};

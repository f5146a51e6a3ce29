// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Arithmetic-intensity lookup table generator
//!
//! Reads the IR opcode signature table, classifies every opcode with the
//! [`opclass`] engine, deduplicates the results into class and vector-type
//! registries, and emits them as constant C lookup tables indexed by opcode id.
//!
//! # Pipeline
//!
//! ```text
//! signatures.csv ──► loader ──► pipeline ──► registry ──► table ──► emit
//!                      ▲        (classify,                         (ai_classes.[ch],
//!     opcode listing ──┘         resolve,                           ai_vtypes.[ch],
//!                                weigh)                             opclasses.csv)
//! ```
//!
//! Bad records never stop a run. Each one becomes a [`Diagnostic`] and the
//! tables are emitted regardless; [`Summary`] counts them per kind.
//!
//! # Example
//!
//! ```
//! use optables::{EmitConfig, Generation, emit};
//!
//! let config = EmitConfig::default();
//! let generation = Generation::run("Iop_Add32Fx4,3,Ity_V128,Ity_V128,Ity_V128\n", None, &config);
//!
//! let table = &generation.table;
//! let id = table.opcode_id("Iop_Add32Fx4").unwrap();
//! assert_eq!(table.op_count(id), Some(4));
//! assert_eq!(table.class_label(table.class_id(id).unwrap()), Some("Icls_FStdArith"));
//!
//! let artifacts = emit(&generation, &config, false).unwrap();
//! assert!(artifacts.get("ai_classes.c").unwrap().contains("Iop_Add32Fx4"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod registry;
pub mod table;

pub use config::EmitConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Summary};
pub use emit::{Artifact, Artifacts, emit};
pub use error::{EmitError, EnumError, GenerateError, GenerateResult, RecordError};
pub use loader::{LoadedSignatures, OpcodeEnum, SignatureRecord, parse_signatures};
pub use pipeline::{ClassifiedOp, Generation};
pub use registry::{ClassKey, Conflict, Interner, Registry, RegistryKey};
pub use table::{OpTable, OpTableRow};

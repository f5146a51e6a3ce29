// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for table generation.

use std::io;
use std::path::PathBuf;

use opclass::{SignatureError, TypeTokenError};
use thiserror::Error;

/// A signature record that could not be parsed. The record is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("line {line}: expected at least 4 fields, found {found}")]
    TooFewFields { line: usize, found: usize },

    #[error("line {line}: {mnemonic}: arity '{arity}' is not a number")]
    BadArity {
        line: usize,
        mnemonic: String,
        arity: String,
    },

    #[error("line {line}: {mnemonic}: arity {arity} but {found} type fields")]
    ArityMismatch {
        line: usize,
        mnemonic: String,
        arity: usize,
        found: usize,
    },

    #[error("line {line}: {mnemonic}: {source}")]
    BadType {
        line: usize,
        mnemonic: String,
        #[source]
        source: TypeTokenError,
    },

    #[error("line {line}: {source}")]
    BadSignature {
        line: usize,
        #[source]
        source: SignatureError,
    },
}

impl RecordError {
    /// Source line of the offending record (1-indexed).
    pub fn line(&self) -> usize {
        match self {
            RecordError::TooFewFields { line, .. }
            | RecordError::BadArity { line, .. }
            | RecordError::ArityMismatch { line, .. }
            | RecordError::BadType { line, .. }
            | RecordError::BadSignature { line, .. } => *line,
        }
    }
}

/// The opcode enumeration listing is unusable. Fatal: ids depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumError {
    #[error("opcode listing is empty")]
    Empty,

    #[error("line {line}: expected '{expected}', found '{found}'")]
    MissingInvalid {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: bad enumerator value '{value}'")]
    BadValue { line: usize, value: String },

    #[error("line {line}: {name} = {value:#x}, expected {expected:#x}")]
    NonContiguous {
        line: usize,
        name: String,
        value: u32,
        expected: u32,
    },

    #[error("line {line}: {name} listed twice")]
    DuplicateName { line: usize, name: String },

    #[error("line {line}: id of {name} does not fit in 32 bits")]
    IdOverflow { line: usize, name: String },
}

/// A table value does not fit the emitted C representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("{what} {value} for {name} does not fit in a UChar")]
    ValueOutOfRange {
        what: &'static str,
        name: String,
        value: u32,
    },
}

/// Fatal errors from a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid opcode listing: {0}")]
    OpcodeEnum(#[from] EnumError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Result type alias for generation runs
pub type GenerateResult<T> = Result<T, GenerateError>;

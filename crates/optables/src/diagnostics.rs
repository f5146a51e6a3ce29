// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-record diagnostics of a generation run.
//!
//! Nothing in here stops a run: every diagnostic is scoped to one record, the
//! record is skipped or given a visible fallback, and the tables are emitted
//! regardless. The [`Summary`] is printed next to the tables so gaps in the
//! classification can be triaged.

use std::fmt;

use opclass::ResolveError;
use thiserror::Error;

use crate::error::RecordError;

/// Something in the input that needs a human to look at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("skipped malformed record: {0}")]
    Malformed(#[from] RecordError),

    #[error("line {line}: {mnemonic} matches no classifier")]
    Unclassified { line: usize, mnemonic: String },

    #[error("line {line}: {source}; emitted as integer")]
    Unresolved {
        line: usize,
        #[source]
        source: ResolveError,
    },

    #[error("{mnemonic}: label {label} already belongs to id {existing_id}; first entry kept")]
    RegistryConflict {
        mnemonic: String,
        label: String,
        existing_id: u32,
    },

    #[error("{mnemonic} has no signature; emitted as INVALID")]
    MissingSignature { mnemonic: String },

    #[error("line {line}: duplicate {mnemonic} (first on line {first_line}); dropped")]
    DuplicateSignature {
        line: usize,
        mnemonic: String,
        first_line: usize,
    },

    #[error("line {line}: {mnemonic} is not in the opcode listing; dropped")]
    UnknownOpcode { line: usize, mnemonic: String },

    #[error("line {line}: {mnemonic} names an enumeration sentinel; dropped")]
    ReservedMnemonic { line: usize, mnemonic: String },
}

/// Diagnostics collected during a run, in the order they were found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Returns true if nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the diagnostics in discovery order
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Consumes the collection and returns the diagnostics
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub(crate) fn push(&mut self, diagnostic: impl Into<Diagnostic>) {
        let diagnostic = diagnostic.into();
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for diagnostic in &self.entries {
            match diagnostic {
                Diagnostic::Malformed(_) | Diagnostic::ReservedMnemonic { .. } => {
                    summary.skipped += 1
                }
                Diagnostic::Unclassified { .. } => summary.unclassified += 1,
                Diagnostic::Unresolved { .. } => summary.unresolved += 1,
                Diagnostic::RegistryConflict { .. } => summary.conflicts += 1,
                Diagnostic::MissingSignature { .. } => summary.missing += 1,
                Diagnostic::DuplicateSignature { .. } => summary.duplicates += 1,
                Diagnostic::UnknownOpcode { .. } => summary.unknown += 1,
            }
        }
        summary
    }
}

/// Counts per diagnostic kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub skipped: usize,
    pub unclassified: usize,
    pub unresolved: usize,
    pub conflicts: usize,
    pub missing: usize,
    pub duplicates: usize,
    pub unknown: usize,
}

impl Summary {
    /// True if some opcode was dropped or ended up without a category.
    pub fn has_gaps(&self) -> bool {
        self.skipped + self.unclassified + self.missing + self.unknown > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} skipped, {} unclassified, {} unresolved, {} conflicting, \
             {} missing, {} duplicate, {} unknown",
            self.skipped,
            self.unclassified,
            self.unresolved,
            self.conflicts,
            self.missing,
            self.duplicates,
            self.unknown
        )
    }
}

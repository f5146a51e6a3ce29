//! Error types for opcode classification

use thiserror::Error;

use crate::category::Category;

/// A declared type token that is not `Ity_<I|F|D|V><bits>` or `ity_RMode`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeTokenError {
    #[error("type token '{0}' does not start with 'Ity_'")]
    MissingPrefix(String),

    #[error("type token '{0}' has an unknown base-type letter")]
    UnknownLetter(String),

    #[error("type token '{0}' has no valid bit width")]
    BadWidth(String),
}

/// A signature whose shape violates the arity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("empty mnemonic")]
    EmptyMnemonic,

    #[error("{mnemonic}: {count} operands (expected 1 to 4)")]
    OperandCount { mnemonic: String, count: usize },
}

/// The type resolver could not pin down a base type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{mnemonic}: base type still ambiguous after resolution (category {category})")]
    UnresolvedBaseType { mnemonic: String, category: Category },
}

//! Opcode signatures

use crate::error::SignatureError;
use crate::types::TypeToken;

/// Declared signature of one IR opcode.
///
/// Holds one result and one to four operands, so `arity()` is always 2 to 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSignature {
    mnemonic: String,
    result: TypeToken,
    operands: Vec<TypeToken>,
}

impl OpSignature {
    pub const MIN_ARITY: usize = 2;
    pub const MAX_ARITY: usize = 5;

    pub fn new(
        mnemonic: impl Into<String>,
        result: TypeToken,
        operands: Vec<TypeToken>,
    ) -> Result<Self, SignatureError> {
        let mnemonic = mnemonic.into();
        if mnemonic.is_empty() {
            return Err(SignatureError::EmptyMnemonic);
        }
        let arity = operands.len() + 1;
        if !(Self::MIN_ARITY..=Self::MAX_ARITY).contains(&arity) {
            return Err(SignatureError::OperandCount {
                mnemonic,
                count: operands.len(),
            });
        }
        Ok(Self {
            mnemonic,
            result,
            operands,
        })
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn result(&self) -> TypeToken {
        self.result
    }

    pub fn operands(&self) -> &[TypeToken] {
        &self.operands
    }

    /// Result plus operands.
    pub fn arity(&self) -> usize {
        self.operands.len() + 1
    }

    /// Result followed by operands, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = TypeToken> + '_ {
        std::iter::once(self.result).chain(self.operands.iter().copied())
    }
}

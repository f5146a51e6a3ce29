//! Base-type resolution
//!
//! The declared result type of many SIMD opcodes is just `V128` or `V256`,
//! which says nothing about whether the lanes are integers or floats. The
//! resolver recovers a concrete [`BaseType`] through a fixed cascade:
//!
//! 1. Seed from the declared result letter. A rounding-mode result is
//!    rewritten to `Ity_I32` and forces Float.
//! 2. An embedded SIMD shape in the mnemonic (`32Fx4`) resolves an ambiguous
//!    seed, and an `F` qualifier also overrides a declared Integer (packed
//!    floats travel in integer registers, e.g. `PwAdd32Fx2 : I64`). Without a
//!    shape, the operands are consulted.
//! 3. Category overrides, for whatever is still ambiguous.
//!
//! Step 3 always runs after step 2; the category overrides only fill gaps the
//! mnemonic and operands leave open.

use crate::category::{Category, Classification};
use crate::error::ResolveError;
use crate::signature::OpSignature;
use crate::types::{BaseType, ResolvedType, SimdShape, TypeLetter, TypeToken};

/// Which step of the cascade settled the base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    DeclaredResult,
    RoundingMode,
    Shape,
    Operands,
    CategoryOverride,
    Fallback,
}

/// Output of the resolver for one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: ResolvedType,
    /// Result token after the rounding-mode rewrite.
    pub result_type: TypeToken,
    /// Seed letter from step 1 (`V` when ambiguous, `F` for rounding mode).
    pub seed: TypeLetter,
    /// Maximum declared width across result and operands.
    pub declared_width: u32,
    pub shape: Option<SimdShape>,
    pub basis: Basis,
}

impl Resolution {
    /// Declared-type summary `Ity_<seed><declared_width>`.
    pub fn parent(&self) -> TypeToken {
        TypeToken::typed(self.seed, self.declared_width)
    }
}

struct Inference {
    base_type: Option<(BaseType, Basis)>,
    result_type: TypeToken,
    seed: TypeLetter,
    declared_width: u32,
    shape: Option<SimdShape>,
}

impl Inference {
    fn into_resolution(self, base_type: BaseType, basis: Basis) -> Resolution {
        let (bit_width, lane_count) = match self.shape {
            Some(shape) => (shape.lane_bits, shape.lane_count()),
            None => (self.declared_width, 1),
        };
        Resolution {
            resolved: ResolvedType {
                base_type,
                bit_width,
                lane_count,
            },
            result_type: self.result_type,
            seed: self.seed,
            declared_width: self.declared_width,
            shape: self.shape,
            basis,
        }
    }
}

/// Resolve the base type, bit width and lane count of a signature.
///
/// # Errors
///
/// [`ResolveError::UnresolvedBaseType`] if the cascade leaves the base type
/// ambiguous.
pub fn resolve(
    signature: &OpSignature,
    classification: &Classification,
) -> Result<Resolution, ResolveError> {
    let inference = infer(signature, classification);
    match inference.base_type {
        Some((base_type, basis)) => Ok(inference.into_resolution(base_type, basis)),
        None => Err(ResolveError::UnresolvedBaseType {
            mnemonic: signature.mnemonic().to_string(),
            category: classification.category,
        }),
    }
}

/// Like [`resolve`], but substitutes `fallback` for an ambiguous base type and
/// hands back the error so the caller can still report it.
pub fn resolve_or(
    signature: &OpSignature,
    classification: &Classification,
    fallback: BaseType,
) -> (Resolution, Option<ResolveError>) {
    match resolve(signature, classification) {
        Ok(resolution) => (resolution, None),
        Err(err) => {
            let inference = infer(signature, classification);
            (inference.into_resolution(fallback, Basis::Fallback), Some(err))
        }
    }
}

fn infer(signature: &OpSignature, classification: &Classification) -> Inference {
    let declared = signature.result();
    let result_type = declared.normalized();

    // Step 1: rounding-mode operands only occur on floating-point operations
    let mut base_type = if declared.is_rounding_mode() {
        Some((BaseType::Float, Basis::RoundingMode))
    } else {
        result_type
            .letter()
            .base_type()
            .map(|b| (b, Basis::DeclaredResult))
    };
    let seed = base_type.map_or(TypeLetter::Vector, |(b, _)| match b {
        BaseType::Integer => TypeLetter::Integer,
        BaseType::Float => TypeLetter::Float,
        BaseType::Decimal => TypeLetter::Decimal,
    });

    // Step 2: embedded SIMD shape, then operands
    let shape = SimdShape::find(signature.mnemonic());
    match (base_type, shape) {
        (None, Some(shape)) => base_type = Some((shape.base_type(), Basis::Shape)),
        (Some((BaseType::Integer, _)), Some(shape)) if shape.is_float() => {
            base_type = Some((BaseType::Float, Basis::Shape))
        }
        (None, None) => base_type = from_operands(signature.operands()),
        _ => {}
    }

    // Step 3: category overrides
    if base_type.is_none() {
        base_type = category_override(classification).map(|b| (b, Basis::CategoryOverride));
    }

    let declared_width = signature.types().map(TypeToken::bits).max().unwrap_or(0);

    Inference {
        base_type,
        result_type,
        seed,
        declared_width,
        shape,
    }
}

/// Operand cascade for an ambiguous result with no embedded shape.
///
/// A rounding-mode operand implies Float. Otherwise every operand must carry
/// the same non-vector letter.
fn from_operands(operands: &[TypeToken]) -> Option<(BaseType, Basis)> {
    if operands.iter().any(|t| t.is_rounding_mode()) {
        return Some((BaseType::Float, Basis::RoundingMode));
    }

    let mut letters = operands.iter().map(|t| t.letter().base_type());
    let first = letters.next()??;
    letters
        .all(|b| b == Some(first))
        .then_some((first, Basis::Operands))
}

/// Base type assumed for a still-ambiguous opcode of a given category.
fn category_override(classification: &Classification) -> Option<BaseType> {
    match classification.category {
        // Data movement and bit manipulation on whole registers
        Category::Shuffle
        | Category::Bitwise
        | Category::Crypt
        | Category::Twiddle
        | Category::Count => Some(BaseType::Integer),

        // Destination letter, then source letter, then Integer
        Category::Convert => {
            let conversion = classification.conversion.unwrap_or_default();
            let destination = conversion.destination.and_then(TypeLetter::base_type);
            let source = conversion.source.and_then(TypeLetter::base_type);
            Some(destination.or(source).unwrap_or(BaseType::Integer))
        }

        // Ambiguous standard arithmetic is wide-integer or packed-decimal
        Category::StdArith => Some(BaseType::Integer),

        _ => None,
    }
}

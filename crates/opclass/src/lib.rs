//! Classification of VEX IR opcodes for arithmetic-intensity accounting
//!
//! This crate provides:
//! - **Category classification** of mnemonics through an ordered,
//!   first-match-wins pattern cascade with manual overrides
//! - **Base-type resolution** of ambiguous vector signatures from the
//!   mnemonic's embedded SIMD shape, the operands and the category
//! - **Operation-count weights** per opcode
//!
//! Everything here is pure; reading signatures and emitting tables lives in
//! the `optables` crate.
//!
//! # Example
//!
//! ```
//! use opclass::{BaseType, Category, OpSignature, classify, op_count, resolve};
//!
//! let v128 = "Ity_V128".parse().unwrap();
//! let sig = OpSignature::new("Iop_Add32Fx4", v128, vec![v128, v128]).unwrap();
//!
//! let class = classify(sig.mnemonic());
//! assert_eq!(class.category, Category::StdArith);
//!
//! let resolution = resolve(&sig, &class).unwrap();
//! assert_eq!(resolution.resolved.base_type, BaseType::Float);
//! assert_eq!(resolution.resolved.label("Aty"), "Aty_F32x4");
//!
//! let ops = op_count(class.category, sig.mnemonic(), resolution.resolved.lane_count);
//! assert_eq!(ops, 4);
//! ```

pub mod category;
pub mod error;
pub mod resolve;
pub mod signature;
pub mod types;
pub mod weight;

pub use category::{
    CLASSIFIERS, Category, Classification, Classifier, Conversion, MANUAL_OVERRIDES, MatchSource,
    classify,
};
pub use error::{ResolveError, SignatureError, TypeTokenError};
pub use resolve::{Basis, Resolution, resolve, resolve_or};
pub use signature::OpSignature;
pub use types::{BaseType, LaneKind, ResolvedType, SimdShape, TypeLetter, TypeToken};
pub use weight::{MultiStep, op_count};

//! Declared and resolved operand types
//!
//! A signature declares its result and operand types as raw VEX tokens
//! (`Ity_I32`, `Ity_F64`, `Ity_V128`, ...). The base-type letter of a
//! vector token (`V`) says nothing about the lanes it carries, so the
//! resolver has to recover the element kind from elsewhere. The rounding-mode
//! token `ity_RMode` is really a 32-bit integer that only ever appears on
//! floating-point operations.

use std::fmt;
use std::str::FromStr;

use crate::error::TypeTokenError;

/// Scalar element kind of a resolved operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    Integer,
    Float,
    Decimal,
}

impl BaseType {
    /// Single-letter code used in class and vector-type labels.
    pub const fn letter(self) -> char {
        match self {
            BaseType::Integer => 'I',
            BaseType::Float => 'F',
            BaseType::Decimal => 'D',
        }
    }

    /// Inverse of [`BaseType::letter`].
    ///
    /// The sign qualifiers `U` and `S` collapse to `Integer`.
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'I' | 'U' | 'S' => Some(BaseType::Integer),
            'F' => Some(BaseType::Float),
            'D' => Some(BaseType::Decimal),
            _ => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Integer => write!(f, "integer"),
            BaseType::Float => write!(f, "float"),
            BaseType::Decimal => write!(f, "decimal"),
        }
    }
}

/// Base-type letter of a declared VEX type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeLetter {
    Integer,
    Float,
    Decimal,
    /// `V`: a SIMD register of unknown element kind.
    Vector,
}

impl TypeLetter {
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(TypeLetter::Integer),
            'F' => Some(TypeLetter::Float),
            'D' => Some(TypeLetter::Decimal),
            'V' => Some(TypeLetter::Vector),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            TypeLetter::Integer => 'I',
            TypeLetter::Float => 'F',
            TypeLetter::Decimal => 'D',
            TypeLetter::Vector => 'V',
        }
    }

    /// The element kind this letter pins down, or `None` for `V`.
    pub const fn base_type(self) -> Option<BaseType> {
        match self {
            TypeLetter::Integer => Some(BaseType::Integer),
            TypeLetter::Float => Some(BaseType::Float),
            TypeLetter::Decimal => Some(BaseType::Decimal),
            TypeLetter::Vector => None,
        }
    }
}

/// A declared result or operand type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeToken {
    /// `Ity_<letter><bits>`
    Typed { letter: TypeLetter, bits: u32 },
    /// `ity_RMode`
    RoundingMode,
}

impl TypeToken {
    pub const ROUNDING_MODE: &'static str = "ity_RMode";
    const PREFIX: &'static str = "Ity_";

    /// Shorthand for a typed token.
    pub const fn typed(letter: TypeLetter, bits: u32) -> Self {
        TypeToken::Typed { letter, bits }
    }

    pub const fn is_rounding_mode(self) -> bool {
        matches!(self, TypeToken::RoundingMode)
    }

    /// Rewrites the rounding-mode sentinel to the `Ity_I32` it is encoded as.
    pub const fn normalized(self) -> Self {
        match self {
            TypeToken::RoundingMode => TypeToken::typed(TypeLetter::Integer, 32),
            typed => typed,
        }
    }

    /// Declared letter after normalization.
    pub const fn letter(self) -> TypeLetter {
        match self.normalized() {
            TypeToken::Typed { letter, .. } => letter,
            TypeToken::RoundingMode => TypeLetter::Integer,
        }
    }

    /// Declared width after normalization.
    pub const fn bits(self) -> u32 {
        match self.normalized() {
            TypeToken::Typed { bits, .. } => bits,
            TypeToken::RoundingMode => 32,
        }
    }
}

impl FromStr for TypeToken {
    type Err = TypeTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::ROUNDING_MODE {
            return Ok(TypeToken::RoundingMode);
        }

        let rest = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypeTokenError::MissingPrefix(s.to_string()))?;

        let mut chars = rest.chars();
        let letter = chars
            .next()
            .and_then(TypeLetter::from_char)
            .ok_or_else(|| TypeTokenError::UnknownLetter(s.to_string()))?;

        let bits: u32 = chars
            .as_str()
            .parse()
            .map_err(|_| TypeTokenError::BadWidth(s.to_string()))?;
        if bits == 0 {
            return Err(TypeTokenError::BadWidth(s.to_string()));
        }

        Ok(TypeToken::typed(letter, bits))
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeToken::Typed { letter, bits } => {
                write!(f, "{}{}{}", Self::PREFIX, letter.as_char(), bits)
            }
            TypeToken::RoundingMode => f.write_str(Self::ROUNDING_MODE),
        }
    }
}

/// Fully resolved operand type; also the key of the vector-type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedType {
    pub base_type: BaseType,
    pub bit_width: u32,
    pub lane_count: u32,
}

impl ResolvedType {
    /// Label of the form `<prefix>_<B><bits>x<lanes>`, e.g. `Aty_F32x4`.
    pub fn label(&self, prefix: &str) -> String {
        format!(
            "{prefix}_{}{}x{}",
            self.base_type.letter(),
            self.bit_width,
            self.lane_count
        )
    }
}

/// Lane qualifier letter inside an embedded SIMD shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneKind {
    Unsigned,
    Signed,
    Float,
}

impl LaneKind {
    const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'U' => Some(LaneKind::Unsigned),
            b'S' => Some(LaneKind::Signed),
            b'F' => Some(LaneKind::Float),
            _ => None,
        }
    }
}

/// A SIMD shape embedded in a mnemonic: `<width>[USF]?x<lanes>[USF]?`.
///
/// `Add32Fx4` embeds `32Fx4`, `QAdd8Ux16` embeds `8Ux16`. The form
/// `<width>F0x<lanes>` (`Add32F0x4`) operates on the lowest lane only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimdShape {
    pub lane_bits: u32,
    pub lanes: u32,
    pub leading: Option<LaneKind>,
    pub trailing: Option<LaneKind>,
    pub lowest_lane_only: bool,
}

impl SimdShape {
    /// Find the first embedded shape in a mnemonic.
    pub fn find(mnemonic: &str) -> Option<Self> {
        let bytes = mnemonic.as_bytes();
        (0..bytes.len())
            .filter(|&i| bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit()))
            .find_map(|i| Self::parse_at(bytes, i))
    }

    fn parse_at(bytes: &[u8], start: usize) -> Option<Self> {
        let (lane_bits, mut pos) = parse_number(bytes, start)?;
        if lane_bits == 0 {
            return None;
        }

        let leading = bytes.get(pos).copied().and_then(LaneKind::from_byte);
        if leading.is_some() {
            pos += 1;
        }

        let lowest_lane_only =
            leading.is_some() && bytes.get(pos) == Some(&b'0') && bytes.get(pos + 1) == Some(&b'x');
        if lowest_lane_only {
            pos += 1;
        }

        if bytes.get(pos) != Some(&b'x') {
            return None;
        }
        let (lanes, pos) = parse_number(bytes, pos + 1)?;
        if lanes == 0 {
            return None;
        }

        // `x4S` is a qualifier, `x4Sub` is the next word
        let trailing = bytes
            .get(pos)
            .copied()
            .and_then(LaneKind::from_byte)
            .filter(|_| !bytes.get(pos + 1).is_some_and(u8::is_ascii_lowercase));

        Some(Self {
            lane_bits,
            lanes,
            leading,
            trailing,
            lowest_lane_only,
        })
    }

    /// Lanes the operation actually computes on.
    pub fn lane_count(&self) -> u32 {
        if self.lowest_lane_only { 1 } else { self.lanes }
    }

    pub fn is_float(&self) -> bool {
        self.leading == Some(LaneKind::Float) || self.trailing == Some(LaneKind::Float)
    }

    /// Float when any qualifier is `F`; otherwise (including no qualifier) Integer.
    pub fn base_type(&self) -> BaseType {
        if self.is_float() {
            BaseType::Float
        } else {
            BaseType::Integer
        }
    }
}

/// Parse a decimal digit run starting at `start`, returning the value and the
/// position after the last digit.
fn parse_number(bytes: &[u8], start: usize) -> Option<(u32, usize)> {
    let len = bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let digits = std::str::from_utf8(&bytes[start..start + len]).ok()?;
    let value = digits.parse().ok()?;
    Some((value, start + len))
}

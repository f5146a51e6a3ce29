//! Semantic category classification
//!
//! Every opcode gets exactly one [`Category`]. The classifiers in
//! [`CLASSIFIERS`] are tried top to bottom and the first match wins, so a
//! mnemonic like `Iop_HAdd8Ux16` (which also contains `Add`) lands in
//! `HozArith` rather than `StdArith`. Mnemonics no classifier matches are
//! looked up in [`MANUAL_OVERRIDES`] and otherwise become
//! [`Category::Unclassified`].
//!
//! Matching is a case-sensitive substring search, so `Sh` in the
//! bit-shift list also catches `Shl`, `Shr` and `ShlN`.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::types::TypeLetter;

/// Semantic class of an operation.
///
/// "Arithmetic" categories are type-neutral: HAdd, MAdd, Sad and friends may
/// only exist for one of integer or floating point, but nothing intrinsic
/// stops them existing for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Rounding and truncation
    FpRound,
    /// Abs, Neg
    ExtArith,
    /// Horizontal SIMD add and subtract
    HozArith,
    /// Add, Sub, Mul, Div
    StdArith,
    /// Arithmetic implying more than one operation per lane
    PlurArith,
    /// Square root, logarithms, trigonometry, ...
    FpFunc,
    Shuffle,
    Bitwise,
    Compar,
    /// Population and leading/trailing bit counts
    Count,
    /// Shifts and rotates
    Twiddle,
    Convert,
    /// Reinterpretation, no arithmetic
    Impotent,
    Crypt,
    Unclassified,
}

impl Category {
    /// All categories in classifier priority order, sentinel last.
    pub const ALL: [Category; 15] = [
        Category::FpRound,
        Category::ExtArith,
        Category::HozArith,
        Category::StdArith,
        Category::PlurArith,
        Category::FpFunc,
        Category::Shuffle,
        Category::Bitwise,
        Category::Compar,
        Category::Count,
        Category::Twiddle,
        Category::Convert,
        Category::Impotent,
        Category::Crypt,
        Category::Unclassified,
    ];

    /// Name used in generated class labels.
    pub const fn name(self) -> &'static str {
        match self {
            Category::FpRound => "FpRound",
            Category::ExtArith => "ExtArith",
            Category::HozArith => "HozArith",
            Category::StdArith => "StdArith",
            Category::PlurArith => "PlurArith",
            Category::FpFunc => "FpFunc",
            Category::Shuffle => "Shuffle",
            Category::Bitwise => "Bitwise",
            Category::Compar => "Compar",
            Category::Count => "Count",
            Category::Twiddle => "Twiddle",
            Category::Convert => "Convert",
            Category::Impotent => "Impotent",
            Category::Crypt => "Crypt",
            Category::Unclassified => "Unclassified",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type letters captured around the `to` of a conversion mnemonic.
///
/// `Iop_F64toI32S` captures `F` and `I`; `Iop_32Uto64` captures neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conversion {
    pub source: Option<TypeLetter>,
    pub destination: Option<TypeLetter>,
}

/// How a classification was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Pattern,
    Manual,
    Unmatched,
}

/// Result of classifying one mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// Present when a conversion matched through its `<w>to<w>` form.
    pub conversion: Option<Conversion>,
    pub source: MatchSource,
}

impl Classification {
    pub fn is_unclassified(&self) -> bool {
        self.category == Category::Unclassified
    }
}

enum Matcher {
    /// Any of the substrings occurs in the mnemonic.
    AnyOf(&'static [&'static str]),
    /// Any of the substrings, or a `<w>to<w>` conversion form.
    Conversion(&'static [&'static str]),
}

/// One entry of the ordered classifier cascade.
pub struct Classifier {
    pub category: Category,
    matcher: Matcher,
}

impl Classifier {
    const fn any_of(category: Category, needles: &'static [&'static str]) -> Self {
        Self {
            category,
            matcher: Matcher::AnyOf(needles),
        }
    }

    const fn conversion(category: Category, needles: &'static [&'static str]) -> Self {
        Self {
            category,
            matcher: Matcher::Conversion(needles),
        }
    }

    /// Test this classifier against a mnemonic.
    ///
    /// Returns `None` if it does not match, otherwise the conversion capture
    /// (always `None` for non-conversion classifiers).
    pub fn matches(&self, mnemonic: &str) -> Option<Option<Conversion>> {
        match self.matcher {
            Matcher::AnyOf(needles) => contains_any(mnemonic, needles).then_some(None),
            Matcher::Conversion(needles) => {
                let capture = find_conversion(mnemonic);
                (capture.is_some() || contains_any(mnemonic, needles)).then_some(capture)
            }
        }
    }
}

/// The cascade, in priority order.
pub const CLASSIFIERS: &[Classifier] = &[
    Classifier::any_of(Category::FpRound, &["Round", "Trunc", "Rnd", "Quantize"]),
    Classifier::any_of(Category::ExtArith, &["Abs", "Neg"]),
    Classifier::any_of(Category::HozArith, &["HAdd", "HSub"]),
    Classifier::any_of(Category::StdArith, &["Add", "Sub", "Mul", "Div"]),
    Classifier::any_of(Category::PlurArith, &["MAdd", "MSub", "Sad", "Avg"]),
    Classifier::any_of(
        Category::FpFunc,
        &[
            "Recip", "Sqrt", "Log", "Exp", "Atan", "Yl2x", "Scale", "PRem", "Sin", "Cos", "Tan",
            "2xm1",
        ],
    ),
    Classifier::any_of(
        Category::Shuffle,
        &[
            "Interleave", "Cat", "Perm", "Reverse", "Left", "Get", "Set", "Dup", "Pack", "Slice",
            "Extract", "Inject",
        ],
    ),
    Classifier::any_of(Category::Bitwise, &["And", "Xor", "Or", "Not"]),
    Classifier::any_of(Category::Compar, &["Cmp", "Max", "Min"]),
    Classifier::any_of(Category::Count, &["Cnt", "Clz", "Ctz", "Cls", "PopCount"]),
    Classifier::any_of(
        Category::Twiddle,
        &["Shl", "Shr", "Sar", "Sal", "Rsh", "Sh", "Rot", "Rol", "Qsh"],
    ),
    Classifier::conversion(Category::Convert, &["Narrow", "Widen", "Fixed", "BCD", "ZeroHI"]),
    Classifier::any_of(Category::Impotent, &["Reinterp"]),
    Classifier::any_of(Category::Crypt, &["Cipher", "SHA"]),
];

/// Mnemonics no classifier pattern catches.
const MANUAL_TABLE: &[(&str, Category)] = &[
    ("Iop_64x4toV256", Category::Convert),
    // Bit-matrix transpose
    ("Iop_PwBitMtxXpose64x2", Category::Shuffle),
    ("Iop_F64x2_2toQ32x4", Category::Convert),
    ("Iop_F32x4_2toQ16x8", Category::Convert),
];

lazy_static! {
    /// Map from exact mnemonic to its manually assigned category
    pub static ref MANUAL_OVERRIDES: HashMap<&'static str, Category> =
        MANUAL_TABLE.iter().copied().collect();
}

/// Classify a mnemonic: first matching pattern, then manual override, then
/// [`Category::Unclassified`].
pub fn classify(mnemonic: &str) -> Classification {
    for classifier in CLASSIFIERS {
        if let Some(conversion) = classifier.matches(mnemonic) {
            return Classification {
                category: classifier.category,
                conversion,
                source: MatchSource::Pattern,
            };
        }
    }

    if let Some(&category) = MANUAL_OVERRIDES.get(mnemonic) {
        log::debug!("{mnemonic}: manual override to {category}");
        return Classification {
            category,
            conversion: None,
            source: MatchSource::Manual,
        };
    }

    Classification {
        category: Category::Unclassified,
        conversion: None,
        source: MatchSource::Unmatched,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

const CONVERSION_WIDTHS: [&str; 7] = ["1", "8", "16", "32", "64", "128", "256"];

/// Locate `[IFVD]?<w>([US]|[HL][IOL])?to[IFVD]?<w>` and capture its letters.
fn find_conversion(mnemonic: &str) -> Option<Conversion> {
    mnemonic.match_indices("to").find_map(|(at, _)| {
        let source = conversion_source(&mnemonic[..at])?;
        let destination = conversion_destination(&mnemonic[at + 2..])?;
        Some(Conversion {
            source,
            destination,
        })
    })
}

/// Parse the text before `to`, right to left. Outer `None` means no match.
fn conversion_source(before: &str) -> Option<Option<TypeLetter>> {
    let bytes = before.as_bytes();
    let n = bytes.len();

    let unqualified = Some(before);
    let sign = (n >= 1 && matches!(bytes[n - 1], b'U' | b'S')).then(|| &before[..n - 1]);
    let half = (n >= 2
        && matches!(bytes[n - 2], b'H' | b'L')
        && matches!(bytes[n - 1], b'I' | b'O' | b'L'))
        .then(|| &before[..n - 2]);

    [unqualified, sign, half]
        .into_iter()
        .flatten()
        .find_map(|stem| {
            let width = CONVERSION_WIDTHS
                .iter()
                .filter(|w| stem.ends_with(*w))
                .max_by_key(|w| w.len())?;
            let rest = &stem[..stem.len() - width.len()];
            Some(rest.chars().last().and_then(conversion_letter))
        })
}

/// Parse the text after `to`, left to right. Outer `None` means no match.
fn conversion_destination(after: &str) -> Option<Option<TypeLetter>> {
    let starts_with_width = |s: &str| CONVERSION_WIDTHS.iter().any(|w| s.starts_with(w));

    let mut chars = after.chars();
    if let Some(letter) = chars.next().and_then(conversion_letter) {
        if starts_with_width(chars.as_str()) {
            return Some(Some(letter));
        }
    }
    starts_with_width(after).then_some(None)
}

fn conversion_letter(c: char) -> Option<TypeLetter> {
    TypeLetter::from_char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(mnemonic: &str) -> Category {
        classify(mnemonic).category
    }

    #[test]
    fn standard_arithmetic() {
        assert_eq!(category("Iop_Add32Fx4"), Category::StdArith);
        assert_eq!(category("Iop_Mul64"), Category::StdArith);
        assert_eq!(category("Iop_DivF64"), Category::StdArith);
    }

    #[test]
    fn horizontal_before_standard() {
        assert_eq!(category("Iop_HAdd8Ux16"), Category::HozArith);
        assert_eq!(category("Iop_HSub16Sx8"), Category::HozArith);
    }

    #[test]
    fn rounding_before_everything() {
        assert_eq!(category("Iop_RoundF64toInt"), Category::FpRound);
        assert_eq!(category("Iop_TruncF64asF32"), Category::FpRound);
    }

    #[test]
    fn multiply_accumulate_is_caught_by_standard_arithmetic() {
        // `MAdd` contains `Add`, which is tried first
        assert_eq!(category("Iop_MAddF64"), Category::StdArith);
        assert_eq!(category("Iop_Avg8Ux16"), Category::PlurArith);
        assert_eq!(category("Iop_Sad8Ux4"), Category::PlurArith);
    }

    #[test]
    fn compare_wins_over_count() {
        let c = classify("Iop_CmpCnt8x16");
        assert_eq!(c.category, Category::Compar);
        assert_eq!(c.source, MatchSource::Pattern);
    }

    #[test]
    fn bit_level_categories() {
        assert_eq!(category("Iop_Perm8x16"), Category::Shuffle);
        assert_eq!(category("Iop_XorV128"), Category::Bitwise);
        assert_eq!(category("Iop_Clz64"), Category::Count);
        assert_eq!(category("Iop_ShlV128"), Category::Twiddle);
        assert_eq!(category("Iop_SHA256"), Category::Crypt);
        assert_eq!(category("Iop_ReinterpF64asI64"), Category::Impotent);
    }

    #[test]
    fn conversion_captures_letters() {
        let c = classify("Iop_F64toI32S");
        assert_eq!(c.category, Category::Convert);
        assert_eq!(
            c.conversion,
            Some(Conversion {
                source: Some(TypeLetter::Float),
                destination: Some(TypeLetter::Integer),
            })
        );
    }

    #[test]
    fn conversion_qualifiers() {
        let c = classify("Iop_32Uto64");
        assert_eq!(c.category, Category::Convert);
        assert_eq!(c.conversion, Some(Conversion::default()));

        let c = classify("Iop_64HLtoV128");
        assert_eq!(c.category, Category::Convert);
        assert_eq!(
            c.conversion,
            Some(Conversion {
                source: None,
                destination: Some(TypeLetter::Vector),
            })
        );

        let c = classify("Iop_V128to64");
        assert_eq!(
            c.conversion,
            Some(Conversion {
                source: Some(TypeLetter::Vector),
                destination: None,
            })
        );
    }

    #[test]
    fn conversion_keywords() {
        let c = classify("Iop_ZeroHI64ofV128");
        assert_eq!(c.category, Category::Convert);
        assert_eq!(c.conversion, None);
    }

    #[test]
    fn manual_overrides() {
        let c = classify("Iop_PwBitMtxXpose64x2");
        assert_eq!(c.category, Category::Shuffle);
        assert_eq!(c.source, MatchSource::Manual);
        assert_eq!(category("Iop_64x4toV256"), Category::Convert);
        assert_eq!(category("Iop_F64x2_2toQ32x4"), Category::Convert);
    }

    #[test]
    fn unmatched_mnemonic_is_unclassified() {
        let c = classify("Iop_Frobnicate");
        assert!(c.is_unclassified());
        assert_eq!(c.source, MatchSource::Unmatched);
    }

    #[test]
    fn category_names_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_name(c.name()), Some(c));
        }
        assert_eq!(Category::from_name("Nope"), None);
    }
}

// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Signature table and opcode enumeration parsers.
//!
//! # Signature records
//!
//! One opcode per line:
//!
//! ```text
//! Iop_Add32Fx4,3,Ity_V128,Ity_V128,Ity_V128
//! Iop_SqrtF64,3,Ity_F64,ity_RMode,Ity_F64
//! ```
//!
//! Fields are the mnemonic, the arity (result plus operands), the result type
//! and `arity - 1` operand types. Blank lines and `#` comments are ignored.
//! Malformed records are returned as [`RecordError`]s alongside the good
//! ones; a bad line never stops the rest of the table from loading.
//!
//! # Opcode enumeration
//!
//! The C enum listing of the IR opcodes, one enumerator per line, starting
//! with `Iop_INVALID=<value>`. It fixes the opcode-id order of the emitted
//! tables. Without it, signature order is used.

use std::collections::HashSet;

use opclass::{OpSignature, TypeToken};

use crate::error::{EnumError, RecordError};

/// A parsed signature and the line it came from.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    /// Original source line number (1-indexed).
    pub line: usize,
    pub signature: OpSignature,
}

/// Output of [`parse_signatures`].
#[derive(Debug, Default)]
pub struct LoadedSignatures {
    /// Good records, in source order, duplicates included.
    pub records: Vec<SignatureRecord>,
    /// Records that were skipped.
    pub errors: Vec<RecordError>,
}

/// Parse a signature table.
pub fn parse_signatures(input: &str) -> LoadedSignatures {
    let mut loaded = LoadedSignatures::default();

    for (idx, text) in input.lines().enumerate() {
        let line = idx + 1;
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        match parse_record(text, line) {
            Ok(signature) => loaded.records.push(SignatureRecord { line, signature }),
            Err(err) => loaded.errors.push(err),
        }
    }

    loaded
}

fn parse_record(text: &str, line: usize) -> Result<OpSignature, RecordError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(RecordError::TooFewFields {
            line,
            found: fields.len(),
        });
    }

    let mnemonic = fields[0];
    let arity: usize = fields[1].parse().map_err(|_| RecordError::BadArity {
        line,
        mnemonic: mnemonic.to_string(),
        arity: fields[1].to_string(),
    })?;

    let type_fields = &fields[2..];
    if type_fields.len() != arity {
        return Err(RecordError::ArityMismatch {
            line,
            mnemonic: mnemonic.to_string(),
            arity,
            found: type_fields.len(),
        });
    }

    let types = type_fields
        .iter()
        .map(|t| {
            t.parse::<TypeToken>().map_err(|source| RecordError::BadType {
                line,
                mnemonic: mnemonic.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (result, operands) = types
        .split_first()
        .ok_or(RecordError::TooFewFields {
            line,
            found: fields.len(),
        })?;

    OpSignature::new(mnemonic, *result, operands.to_vec())
        .map_err(|source| RecordError::BadSignature { line, source })
}

/// The IR opcode enumeration, `INVALID` and `LAST` excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeEnum {
    invalid: u32,
    names: Vec<String>,
}

impl OpcodeEnum {
    /// Build an enumeration from opcode names, with `INVALID` at 0.
    pub fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            invalid: 0,
            names: names.into_iter().collect(),
        }
    }

    /// Parse an enum listing for opcodes named `<prefix>_*`.
    ///
    /// Trailing commas and `//` or `/* */` comments on a line are ignored.
    /// Parsing stops at `<prefix>_LAST`.
    ///
    /// # Errors
    ///
    /// - [`EnumError::Empty`]: No enumerators
    /// - [`EnumError::MissingInvalid`]: First enumerator is not `<prefix>_INVALID`
    /// - [`EnumError::BadValue`]: Unparsable explicit value
    /// - [`EnumError::NonContiguous`]: Explicit value breaks the dense id range
    /// - [`EnumError::DuplicateName`]: Enumerator listed twice
    /// - [`EnumError::IdOverflow`]: An id, `LAST` included, exceeds `u32`
    pub fn parse(input: &str, prefix: &str) -> Result<Self, EnumError> {
        let invalid_name = format!("{prefix}_INVALID");
        let last_name = format!("{prefix}_LAST");

        let mut entries = input
            .lines()
            .enumerate()
            .map(|(idx, text)| (idx + 1, strip_comment(text).trim().trim_end_matches(',')))
            .filter(|(_, text)| !text.is_empty());

        let (line, first) = entries.next().ok_or(EnumError::Empty)?;
        let (name, value) = split_enumerator(first);
        if name != invalid_name {
            return Err(EnumError::MissingInvalid {
                line,
                expected: invalid_name,
                found: name.to_string(),
            });
        }
        let invalid = match value {
            Some(value) => parse_value(value).ok_or_else(|| EnumError::BadValue {
                line,
                value: value.to_string(),
            })?,
            None => 0,
        };

        let mut names = Vec::new();
        let mut seen = HashSet::from([invalid_name.as_str()]);
        for (line, text) in entries {
            let (name, value) = split_enumerator(text);
            // Every id up to and including LAST must fit
            let expected = u32::try_from(names.len() + 1)
                .ok()
                .and_then(|offset| invalid.checked_add(offset))
                .ok_or_else(|| EnumError::IdOverflow {
                    line,
                    name: name.to_string(),
                })?;

            if let Some(value) = value {
                let value = parse_value(value).ok_or_else(|| EnumError::BadValue {
                    line,
                    value: value.to_string(),
                })?;
                if value != expected {
                    return Err(EnumError::NonContiguous {
                        line,
                        name: name.to_string(),
                        value,
                        expected,
                    });
                }
            }

            if name == last_name {
                break;
            }
            if !seen.insert(name) {
                return Err(EnumError::DuplicateName {
                    line,
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
        }

        // LAST may be implicit at the end of the listing
        let fits = u32::try_from(names.len() + 1)
            .ok()
            .and_then(|offset| invalid.checked_add(offset))
            .is_some();
        if !fits {
            return Err(EnumError::IdOverflow {
                line: input.lines().count(),
                name: last_name,
            });
        }

        Ok(Self { invalid, names })
    }

    /// Numeric value of the `INVALID` sentinel.
    pub fn invalid_id(&self) -> u32 {
        self.invalid
    }

    /// Numeric value of the `LAST` sentinel. Fits in `u32` for any parsed
    /// listing.
    pub fn last_id(&self) -> u32 {
        self.invalid + self.names.len() as u32 + 1
    }

    /// Opcode names in id order, sentinels excluded.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Numeric id of the opcode at `index` into [`OpcodeEnum::names`].
    pub fn id_of(&self, index: usize) -> u32 {
        self.invalid + index as u32 + 1
    }
}

/// Split `NAME = value` into its parts.
fn split_enumerator(text: &str) -> (&str, Option<&str>) {
    match text.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (text, None),
    }
}

fn parse_value(value: &str) -> Option<u32> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Remove `//` and `/*` comments from a line.
fn strip_comment(line: &str) -> &str {
    let mut end = line.len();

    if let Some(pos) = line.find("//") {
        end = end.min(pos);
    }
    if let Some(pos) = line.find("/*") {
        end = end.min(pos);
    }

    &line[..end]
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use opclass::{SignatureError, TypeLetter, TypeTokenError};

    use super::*;

    #[test]
    fn parses_records_in_order() {
        let loaded = parse_signatures(indoc! {"
            Iop_Add32Fx4,3,Ity_V128,Ity_V128,Ity_V128
            Iop_SqrtF64,3,Ity_F64,ity_RMode,Ity_F64
            Iop_Not64,2,Ity_I64,Ity_I64
        "});
        assert!(loaded.errors.is_empty());
        let mnemonics: Vec<_> = loaded
            .records
            .iter()
            .map(|r| r.signature.mnemonic())
            .collect();
        assert_eq!(mnemonics, ["Iop_Add32Fx4", "Iop_SqrtF64", "Iop_Not64"]);
        assert_eq!(loaded.records[1].line, 2);
        assert_eq!(loaded.records[1].signature.operands()[0], TypeToken::RoundingMode);
        assert_eq!(loaded.records[2].signature.arity(), 2);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let loaded = parse_signatures(indoc! {"
            # mnemonic,arity,result,operands...

            Iop_Not64,2,Ity_I64,Ity_I64
        "});
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].line, 3);
    }

    #[test]
    fn trims_fields() {
        let loaded = parse_signatures("  Iop_Not64 , 2 , Ity_I64 , Ity_I64  ");
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(
            loaded.records[0].signature.result(),
            TypeToken::typed(TypeLetter::Integer, 64)
        );
    }

    #[test]
    fn preserves_duplicates() {
        let loaded = parse_signatures(indoc! {"
            Iop_Not64,2,Ity_I64,Ity_I64
            Iop_Not64,2,Ity_I64,Ity_I64
        "});
        assert_eq!(loaded.records.len(), 2);
    }

    #[test]
    fn bad_records_are_skipped_not_fatal() {
        let loaded = parse_signatures(indoc! {"
            Iop_Short,2
            Iop_BadArity,two,Ity_I64,Ity_I64
            Iop_Mismatch,3,Ity_I64,Ity_I64
            Iop_BadType,2,Ity_Q64,Ity_I64
            Iop_TooMany,6,Ity_I8,Ity_I8,Ity_I8,Ity_I8,Ity_I8,Ity_I8
            ,2,Ity_I8,Ity_I8
            Iop_Good,2,Ity_I8,Ity_I8
        "});
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].signature.mnemonic(), "Iop_Good");
        assert_eq!(
            loaded.errors,
            vec![
                RecordError::TooFewFields { line: 1, found: 2 },
                RecordError::BadArity {
                    line: 2,
                    mnemonic: "Iop_BadArity".into(),
                    arity: "two".into(),
                },
                RecordError::ArityMismatch {
                    line: 3,
                    mnemonic: "Iop_Mismatch".into(),
                    arity: 3,
                    found: 2,
                },
                RecordError::BadType {
                    line: 4,
                    mnemonic: "Iop_BadType".into(),
                    source: TypeTokenError::UnknownLetter("Ity_Q64".into()),
                },
                RecordError::BadSignature {
                    line: 5,
                    source: SignatureError::OperandCount {
                        mnemonic: "Iop_TooMany".into(),
                        count: 5,
                    },
                },
                RecordError::BadSignature {
                    line: 6,
                    source: SignatureError::EmptyMnemonic,
                },
            ]
        );
        assert_eq!(loaded.errors[3].line(), 4);
    }

    #[test]
    fn parse_enum_listing() {
        let listing = OpcodeEnum::parse(
            indoc! {"
                Iop_INVALID=0x1400,
                Iop_Add8,  /* 8-bit add */
                Iop_Add16, // 16-bit add
                Iop_Add32=0x1403,

                Iop_LAST
            "},
            "Iop",
        )
        .unwrap();
        assert_eq!(listing.invalid_id(), 0x1400);
        assert_eq!(listing.names(), ["Iop_Add8", "Iop_Add16", "Iop_Add32"]);
        assert_eq!(listing.id_of(0), 0x1401);
        assert_eq!(listing.last_id(), 0x1404);
    }

    #[test]
    fn enum_listing_ids_must_fit() {
        assert_eq!(
            OpcodeEnum::parse("Iop_INVALID=0xffffffff\nIop_A\nIop_LAST\n", "Iop"),
            Err(EnumError::IdOverflow {
                line: 2,
                name: "Iop_A".into(),
            })
        );
        assert_eq!(
            OpcodeEnum::parse("Iop_INVALID=0xffffffff\n", "Iop"),
            Err(EnumError::IdOverflow {
                line: 1,
                name: "Iop_LAST".into(),
            })
        );

        let listing =
            OpcodeEnum::parse("Iop_INVALID=0xfffffffd\nIop_A\nIop_LAST\n", "Iop").unwrap();
        assert_eq!(listing.last_id(), u32::MAX);
    }

    #[test]
    fn enum_listing_without_values() {
        let listing = OpcodeEnum::parse("Iop_INVALID\nIop_Add8\n", "Iop").unwrap();
        assert_eq!(listing.invalid_id(), 0);
        assert_eq!(listing.last_id(), 2);
    }

    #[test]
    fn enum_listing_errors() {
        assert_eq!(OpcodeEnum::parse("\n\n", "Iop"), Err(EnumError::Empty));
        assert!(matches!(
            OpcodeEnum::parse("Iop_Add8\n", "Iop"),
            Err(EnumError::MissingInvalid { line: 1, .. })
        ));
        assert!(matches!(
            OpcodeEnum::parse("Iop_INVALID=zz\n", "Iop"),
            Err(EnumError::BadValue { line: 1, .. })
        ));
        assert_eq!(
            OpcodeEnum::parse("Iop_INVALID=0x10\nIop_A\nIop_B=0x20\n", "Iop"),
            Err(EnumError::NonContiguous {
                line: 3,
                name: "Iop_B".into(),
                value: 0x20,
                expected: 0x12,
            })
        );
        assert_eq!(
            OpcodeEnum::parse("Iop_INVALID\nIop_A\nIop_A\n", "Iop"),
            Err(EnumError::DuplicateName {
                line: 3,
                name: "Iop_A".into(),
            })
        );
        assert_eq!(
            OpcodeEnum::parse("Iop_INVALID\nIop_A\nIop_INVALID\n", "Iop"),
            Err(EnumError::DuplicateName {
                line: 3,
                name: "Iop_INVALID".into(),
            })
        );
    }
}

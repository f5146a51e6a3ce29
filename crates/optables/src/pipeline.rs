// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The single forward pass from signatures to tables.
//!
//! 1. Load signatures, skipping malformed records.
//! 2. Fix the opcode order: the opcode listing if there is one, else
//!    signature order. Duplicate and unlisted signatures are dropped.
//! 3. For each opcode in order: classify, resolve, weigh, intern.
//! 4. Assemble the dense [`OpTable`].
//!
//! Registries are only written in step 3, so ids depend on nothing but the
//! opcode order and the run is deterministic.

use std::collections::HashMap;

use opclass::{
    BaseType, Classification, MatchSource, OpSignature, Resolution, classify, op_count, resolve_or,
};

use crate::config::EmitConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::loader::{OpcodeEnum, SignatureRecord, parse_signatures};
use crate::registry::{ClassKey, Interner, Registry, RegistryKey};
use crate::table::{OpTable, OpTableRow};

/// Everything known about one classified opcode.
#[derive(Debug, Clone)]
pub struct ClassifiedOp {
    pub opcode_id: u32,
    /// Signature line in the input.
    pub line: usize,
    pub signature: OpSignature,
    pub classification: Classification,
    pub resolution: Resolution,
    pub op_count: u32,
    pub class_id: u32,
    pub vtype_id: u32,
}

impl ClassifiedOp {
    pub fn mnemonic(&self) -> &str {
        self.signature.mnemonic()
    }
}

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub table: OpTable,
    pub registry: Registry,
    /// Classified opcodes in opcode-id order; opcodes without a signature
    /// are absent.
    pub ops: Vec<ClassifiedOp>,
    pub diagnostics: Diagnostics,
}

impl Generation {
    /// Parse and classify a signature table.
    ///
    /// With `opcodes`, ids follow the listing; otherwise signature order with
    /// `INVALID` at 0.
    pub fn run(signatures: &str, opcodes: Option<&OpcodeEnum>, config: &EmitConfig) -> Self {
        let mut diagnostics = Diagnostics::default();

        let loaded = parse_signatures(signatures);
        log::debug!(
            "loaded {} signatures, {} malformed",
            loaded.records.len(),
            loaded.errors.len()
        );
        for err in loaded.errors {
            diagnostics.push(err);
        }

        let reserved = [config.opcode_invalid(), config.opcode_last()];
        let by_mnemonic = index_signatures(loaded.records, &reserved, &mut diagnostics);

        let derived;
        let opcodes = match opcodes {
            Some(opcodes) => {
                report_unlisted(&by_mnemonic, opcodes, &mut diagnostics);
                opcodes
            }
            None => {
                let mut names: Vec<_> = by_mnemonic.values().collect();
                names.sort_by_key(|(order, _)| *order);
                derived = OpcodeEnum::from_names(
                    names
                        .into_iter()
                        .map(|(_, record)| record.signature.mnemonic().to_string()),
                );
                &derived
            }
        };

        let mut registry = Registry::new(&config.class_prefix, &config.vtype_prefix);
        let mut ops = Vec::with_capacity(opcodes.names().len());
        let mut rows = Vec::with_capacity(opcodes.names().len() + 2);
        let mut mnemonics = Vec::with_capacity(opcodes.names().len() + 2);

        rows.push(OpTableRow {
            opcode_id: opcodes.invalid_id(),
            class_id: 0,
            op_count: 0,
        });
        mnemonics.push(config.opcode_invalid());

        for (index, name) in opcodes.names().iter().enumerate() {
            let opcode_id = opcodes.id_of(index);
            mnemonics.push(name.clone());

            let Some((_, record)) = by_mnemonic.get(name.as_str()) else {
                diagnostics.push(Diagnostic::MissingSignature {
                    mnemonic: name.clone(),
                });
                rows.push(OpTableRow {
                    opcode_id,
                    class_id: 0,
                    op_count: 0,
                });
                continue;
            };

            let op = classify_record(opcode_id, record, &mut registry, &mut diagnostics);
            rows.push(OpTableRow {
                opcode_id,
                class_id: op.class_id,
                op_count: op.op_count,
            });
            ops.push(op);
        }

        rows.push(OpTableRow {
            opcode_id: opcodes.last_id(),
            class_id: registry.classes.last_id(),
            op_count: 0,
        });
        mnemonics.push(config.opcode_last());

        let table = OpTable::new(
            opcodes.invalid_id(),
            rows,
            mnemonics,
            registry.classes.labels_with_sentinels(),
            registry.vtypes.labels_with_sentinels(),
        );

        log::info!(
            "classified {} opcodes into {} classes and {} vector types",
            ops.len(),
            registry.classes.len(),
            registry.vtypes.len()
        );

        Self {
            table,
            registry,
            ops,
            diagnostics,
        }
    }

    pub fn op(&self, mnemonic: &str) -> Option<&ClassifiedOp> {
        self.ops.iter().find(|op| op.mnemonic() == mnemonic)
    }
}

/// Map mnemonics to their first signature, remembering source order.
///
/// Signatures named after a sentinel are dropped; the sentinels always get
/// their own rows.
fn index_signatures(
    records: Vec<SignatureRecord>,
    reserved: &[String],
    diagnostics: &mut Diagnostics,
) -> HashMap<String, (usize, SignatureRecord)> {
    let mut by_mnemonic: HashMap<String, (usize, SignatureRecord)> = HashMap::new();
    for (order, record) in records.into_iter().enumerate() {
        let mnemonic = record.signature.mnemonic().to_string();
        if reserved.contains(&mnemonic) {
            diagnostics.push(Diagnostic::ReservedMnemonic {
                line: record.line,
                mnemonic,
            });
            continue;
        }
        if let Some((_, first)) = by_mnemonic.get(&mnemonic) {
            diagnostics.push(Diagnostic::DuplicateSignature {
                line: record.line,
                mnemonic,
                first_line: first.line,
            });
            continue;
        }
        by_mnemonic.insert(mnemonic, (order, record));
    }
    by_mnemonic
}

/// Report signatures for opcodes the listing does not contain, in source order.
fn report_unlisted(
    by_mnemonic: &HashMap<String, (usize, SignatureRecord)>,
    opcodes: &OpcodeEnum,
    diagnostics: &mut Diagnostics,
) {
    let listed: std::collections::HashSet<&str> =
        opcodes.names().iter().map(String::as_str).collect();
    let mut unlisted: Vec<_> = by_mnemonic
        .iter()
        .filter(|(mnemonic, _)| !listed.contains(mnemonic.as_str()))
        .map(|(mnemonic, (order, record))| (*order, record.line, mnemonic.clone()))
        .collect();
    unlisted.sort();
    for (_, line, mnemonic) in unlisted {
        diagnostics.push(Diagnostic::UnknownOpcode { line, mnemonic });
    }
}

fn classify_record(
    opcode_id: u32,
    record: &SignatureRecord,
    registry: &mut Registry,
    diagnostics: &mut Diagnostics,
) -> ClassifiedOp {
    let signature = &record.signature;
    let mnemonic = signature.mnemonic();

    let classification = classify(mnemonic);
    if classification.source == MatchSource::Unmatched {
        diagnostics.push(Diagnostic::Unclassified {
            line: record.line,
            mnemonic: mnemonic.to_string(),
        });
    }

    let (resolution, unresolved) = resolve_or(signature, &classification, BaseType::Integer);
    if let Some(source) = unresolved {
        diagnostics.push(Diagnostic::Unresolved {
            line: record.line,
            source,
        });
    }

    let resolved = resolution.resolved;
    let op_count = op_count(classification.category, mnemonic, resolved.lane_count);

    let class_id = intern(
        &mut registry.classes,
        ClassKey {
            category: classification.category,
            base_type: resolved.base_type,
        },
        mnemonic,
        diagnostics,
    );
    let vtype_id = intern(&mut registry.vtypes, resolved, mnemonic, diagnostics);

    log::trace!(
        "{mnemonic}: {} {} ops={op_count}",
        classification.category,
        resolved.label("Aty")
    );

    ClassifiedOp {
        opcode_id,
        line: record.line,
        signature: signature.clone(),
        classification,
        resolution,
        op_count,
        class_id,
        vtype_id,
    }
}

fn intern<K: RegistryKey>(
    interner: &mut Interner<K>,
    key: K,
    mnemonic: &str,
    diagnostics: &mut Diagnostics,
) -> u32 {
    interner.intern(key).unwrap_or_else(|conflict| {
        diagnostics.push(Diagnostic::RegistryConflict {
            mnemonic: mnemonic.to_string(),
            label: conflict.label,
            existing_id: conflict.existing_id,
        });
        conflict.existing_id
    })
}

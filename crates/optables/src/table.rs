// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense per-opcode lookup table.

/// One slot of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpTableRow {
    /// Numeric opcode id.
    pub opcode_id: u32,
    /// Class registry id; 0 is `INVALID`.
    pub class_id: u32,
    pub op_count: u32,
}

/// The opcode table covering every id from `INVALID` to `LAST` inclusive.
///
/// Row `i` belongs to opcode id `invalid_id() + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTable {
    invalid_id: u32,
    rows: Vec<OpTableRow>,
    mnemonics: Vec<String>,
    class_labels: Vec<String>,
    vtype_labels: Vec<String>,
}

impl OpTable {
    /// Assemble a table. `rows` and `mnemonics` include both sentinels, as do
    /// the label lists.
    pub(crate) fn new(
        invalid_id: u32,
        rows: Vec<OpTableRow>,
        mnemonics: Vec<String>,
        class_labels: Vec<String>,
        vtype_labels: Vec<String>,
    ) -> Self {
        debug_assert_eq!(rows.len(), mnemonics.len());
        debug_assert!(
            rows.iter()
                .enumerate()
                .all(|(i, row)| row.opcode_id == invalid_id + i as u32)
        );
        Self {
            invalid_id,
            rows,
            mnemonics,
            class_labels,
            vtype_labels,
        }
    }

    pub fn invalid_id(&self) -> u32 {
        self.invalid_id
    }

    pub fn last_id(&self) -> u32 {
        self.invalid_id + self.rows.len() as u32 - 1
    }

    /// `LAST - INVALID + 1`
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[OpTableRow] {
        &self.rows
    }

    fn index(&self, opcode_id: u32) -> Option<usize> {
        let index = opcode_id.checked_sub(self.invalid_id)? as usize;
        (index < self.rows.len()).then_some(index)
    }

    pub fn row(&self, opcode_id: u32) -> Option<&OpTableRow> {
        self.index(opcode_id).map(|i| &self.rows[i])
    }

    pub fn op_count(&self, opcode_id: u32) -> Option<u32> {
        self.row(opcode_id).map(|row| row.op_count)
    }

    pub fn class_id(&self, opcode_id: u32) -> Option<u32> {
        self.row(opcode_id).map(|row| row.class_id)
    }

    /// Mnemonic of an opcode id, sentinels included.
    pub fn mnemonic(&self, opcode_id: u32) -> Option<&str> {
        self.index(opcode_id).map(|i| self.mnemonics[i].as_str())
    }

    /// Opcode id of a mnemonic.
    pub fn opcode_id(&self, mnemonic: &str) -> Option<u32> {
        self.mnemonics
            .iter()
            .position(|m| m == mnemonic)
            .map(|i| self.invalid_id + i as u32)
    }

    /// Label of a class id, sentinels included.
    pub fn class_label(&self, class_id: u32) -> Option<&str> {
        self.class_labels.get(class_id as usize).map(String::as_str)
    }

    /// Label of a vector-type id, sentinels included.
    pub fn vtype_label(&self, vtype_id: u32) -> Option<&str> {
        self.vtype_labels.get(vtype_id as usize).map(String::as_str)
    }

    pub fn mnemonics(&self) -> &[String] {
        &self.mnemonics
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn vtype_labels(&self) -> &[String] {
        &self.vtype_labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OpTable {
        let rows = vec![
            OpTableRow {
                opcode_id: 0x10,
                class_id: 0,
                op_count: 0,
            },
            OpTableRow {
                opcode_id: 0x11,
                class_id: 1,
                op_count: 4,
            },
            OpTableRow {
                opcode_id: 0x12,
                class_id: 2,
                op_count: 0,
            },
        ];
        OpTable::new(
            0x10,
            rows,
            vec!["Iop_INVALID".into(), "Iop_Add32Fx4".into(), "Iop_LAST".into()],
            vec!["Icls_INVALID".into(), "Icls_FStdArith".into(), "Icls_LAST".into()],
            vec!["Aty_INVALID".into(), "Aty_F32x4".into(), "Aty_LAST".into()],
        )
    }

    #[test]
    fn lookups_are_offset_by_invalid() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.last_id(), 0x12);
        assert_eq!(table.op_count(0x11), Some(4));
        assert_eq!(table.mnemonic(0x11), Some("Iop_Add32Fx4"));
        assert_eq!(table.opcode_id("Iop_Add32Fx4"), Some(0x11));
        assert_eq!(table.class_label(1), Some("Icls_FStdArith"));
        assert_eq!(table.vtype_label(1), Some("Aty_F32x4"));
    }

    #[test]
    fn out_of_range_lookups() {
        let table = sample();
        assert_eq!(table.row(0x0f), None);
        assert_eq!(table.row(0x13), None);
        assert_eq!(table.class_label(3), None);
        assert_eq!(table.opcode_id("Iop_Nope"), None);
    }
}

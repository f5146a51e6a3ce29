// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Naming of the generated tables and files.

/// Prefixes, file names and boilerplate of the generated C tables.
///
/// The defaults match the names the instrumentation tool is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitConfig {
    /// Prefix of class enumerators, `Icls` -> `Icls_FStdArith`.
    pub class_prefix: String,
    /// Prefix of vector-type enumerators, `Aty` -> `Aty_F32x4`.
    pub vtype_prefix: String,
    /// Prefix of the IR opcode enumerators, `Iop` -> `Iop_Add32Fx4`.
    pub opcode_prefix: String,
    /// Stem of the class header and source files.
    pub classes_stem: String,
    /// Stem of the vector-type header and source files.
    pub vtypes_stem: String,
    /// File name of the per-opcode classification report.
    pub report_name: String,
    /// Header declaring the opcode enumeration.
    pub ir_header: String,
    /// Comment placed at the top of every generated C file.
    pub banner: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            class_prefix: "Icls".to_string(),
            vtype_prefix: "Aty".to_string(),
            opcode_prefix: "Iop".to_string(),
            classes_stem: "ai_classes".to_string(),
            vtypes_stem: "ai_vtypes".to_string(),
            report_name: "opclasses.csv".to_string(),
            ir_header: "libvex_ir.h".to_string(),
            banner: "Generated by optables from the IR opcode signature table. Do not edit."
                .to_string(),
        }
    }
}

impl EmitConfig {
    /// `<prefix>_INVALID` for the opcode enumeration.
    pub fn opcode_invalid(&self) -> String {
        format!("{}_INVALID", self.opcode_prefix)
    }

    /// `<prefix>_LAST` for the opcode enumeration.
    pub fn opcode_last(&self) -> String {
        format!("{}_LAST", self.opcode_prefix)
    }

    /// Include guard for a generated header, `ai_classes` -> `__AI_CLASSES_H`.
    pub fn header_guard(stem: &str) -> String {
        format!("__{}_H", stem.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::EmitConfig;

    #[test]
    fn default_names() {
        let config = EmitConfig::default();
        assert_eq!(config.opcode_invalid(), "Iop_INVALID");
        assert_eq!(config.opcode_last(), "Iop_LAST");
        assert_eq!(EmitConfig::header_guard(&config.classes_stem), "__AI_CLASSES_H");
    }
}

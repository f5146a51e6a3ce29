// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! C table emission.
//!
//! Every array runs over the full opcode range `INVALID..=LAST`, so the
//! consumer can index it with `op - Iop_INVALID` and no bounds bookkeeping.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EmitConfig;
use crate::error::{EmitError, GenerateError, GenerateResult};
use crate::pipeline::Generation;

/// Returned by the mnemonic switch for ids outside the enumeration.
const SWITCH_FALLBACK: &str = "!!!ERROR!!!";

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub contents: String,
}

/// The generated files of one run, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    files: Vec<Artifact>,
}

impl Artifacts {
    pub fn files(&self) -> &[Artifact] {
        &self.files
    }

    /// Contents of the file called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.name == name)
            .map(|file| file.contents.as_str())
    }

    /// Write every file into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> GenerateResult<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| GenerateError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let path = dir.join(&file.name);
            fs::write(&path, &file.contents).map_err(|source| GenerateError::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Render the C tables, plus the classification report if `report` is set.
///
/// # Errors
///
/// [`EmitError::ValueOutOfRange`] if a class id or op count does not fit in
/// the `UChar` fields of `AIOpCount`.
pub fn emit(
    generation: &Generation,
    config: &EmitConfig,
    report: bool,
) -> Result<Artifacts, EmitError> {
    check_ranges(generation)?;

    let mut files = vec![
        Artifact {
            name: format!("{}.h", config.classes_stem),
            contents: classes_header(generation, config),
        },
        Artifact {
            name: format!("{}.c", config.classes_stem),
            contents: classes_source(generation, config),
        },
        Artifact {
            name: format!("{}.h", config.vtypes_stem),
            contents: vtypes_header(generation, config),
        },
        Artifact {
            name: format!("{}.c", config.vtypes_stem),
            contents: vtypes_source(generation, config),
        },
    ];
    if report {
        files.push(Artifact {
            name: config.report_name.clone(),
            contents: classification_report(generation),
        });
    }

    Ok(Artifacts { files })
}

fn check_ranges(generation: &Generation) -> Result<(), EmitError> {
    let table = &generation.table;
    for row in table.rows() {
        let name = || {
            table
                .mnemonic(row.opcode_id)
                .unwrap_or_default()
                .to_string()
        };
        if row.class_id > u32::from(u8::MAX) {
            return Err(EmitError::ValueOutOfRange {
                what: "class id",
                name: name(),
                value: row.class_id,
            });
        }
        if row.op_count > u32::from(u8::MAX) {
            return Err(EmitError::ValueOutOfRange {
                what: "op count",
                name: name(),
                value: row.op_count,
            });
        }
    }
    Ok(())
}

fn banner(config: &EmitConfig) -> String {
    format!("/*\n * {}\n */\n\n", config.banner)
}

/// `typedef enum { ... } <name>;` with explicit values on the first entry.
fn c_enum(labels: &[String], name: &str) -> String {
    let mut out = String::from("typedef enum {\n");
    for (id, label) in labels.iter().enumerate() {
        if id == 0 {
            out.push_str(&format!("    {label}=0x{id:02x},\n"));
        } else if id + 1 == labels.len() {
            out.push_str(&format!("    {label}\n"));
        } else {
            out.push_str(&format!("    {label},\n"));
        }
    }
    out.push_str(&format!("}} {name};\n\n"));
    out
}

/// `static const HChar* const <name>[...] = { "...", ... };`
fn c_string_array(name: &str, size: &str, items: &[String]) -> String {
    let mut out = format!("static const HChar* const {name}[{size}] = {{\n");
    let last = items.len().saturating_sub(1);
    for (i, item) in items.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        out.push_str(&format!("    \"{item}\"{sep}\n"));
    }
    out.push_str("};\n\n");
    out
}

fn range(prefix: &str) -> String {
    format!("{prefix}_LAST-{prefix}_INVALID+1")
}

fn classes_header(generation: &Generation, config: &EmitConfig) -> String {
    let guard = EmitConfig::header_guard(&config.classes_stem);
    let cls = &config.class_prefix;

    let mut out = banner(config);
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str(&format!("#include \"{}\" /* IROp */\n\n", config.ir_header));
    out.push_str(&c_enum(generation.table.class_labels(), "AIClass"));
    out.push_str(&format!("#define AI_N_CLASSES ({cls}_LAST-{cls}_INVALID+1)\n\n"));
    out.push_str("typedef struct {\n    UChar cls;\n    UChar nOps;\n} AIOpCount;\n\n");
    out.push_str("void ppAIClass(AIClass cls);\n\n");
    out.push_str("AIOpCount aiGetOpCount(IROp op);\n\n");
    out.push_str("const HChar* aiGetClassLabel(AIClass cls);\n\n");
    out.push_str("const HChar* aiGetOpMnemonic(IROp op);\n\n");
    out.push_str("const HChar* aiGetOpMnemonicAlt(IROp op);\n\n");
    out.push_str(&format!("#endif /* {guard} */\n"));
    out
}

fn classes_source(generation: &Generation, config: &EmitConfig) -> String {
    let table = &generation.table;
    let cls = &config.class_prefix;
    let iop = &config.opcode_prefix;

    let mut out = banner(config);
    out.push_str(&format!("#include \"{}.h\"\n", config.classes_stem));
    out.push_str("#include \"pub_tool_basics.h\"\n");
    out.push_str("#include \"pub_tool_libcprint.h\"\n\n");

    out.push_str(&c_string_array("_aicls_to_str", &range(cls), table.class_labels()));

    out.push_str(&format!(
        "static const AIOpCount _irop_to_aiopcount[{}] = {{\n",
        range(iop)
    ));
    let last = table.len().saturating_sub(1);
    for (i, row) in table.rows().iter().enumerate() {
        let label = table.class_label(row.class_id).unwrap_or_default();
        let mnemonic = table.mnemonic(row.opcode_id).unwrap_or_default();
        let sep = if i == last { "" } else { "," };
        out.push_str(&format!(
            "    {{ (UChar){label}, (UChar){} }}{sep}  /* {mnemonic} */\n",
            row.op_count
        ));
    }
    out.push_str("};\n\n");

    out.push_str(&c_string_array("_irop_to_str", &range(iop), table.mnemonics()));

    out.push_str(&format!(
        "void ppAIClass(AIClass cls) {{\n    \
         const HChar* str = _aicls_to_str[cls-{cls}_INVALID];\n    \
         VG_(printf)(\"%s\", str);\n}}\n\n"
    ));
    out.push_str(&format!(
        "AIOpCount aiGetOpCount(IROp op) {{\n    \
         return _irop_to_aiopcount[op-{iop}_INVALID];\n}}\n\n"
    ));
    out.push_str(&format!(
        "const HChar* aiGetClassLabel(AIClass cls) {{\n    \
         return _aicls_to_str[cls-{cls}_INVALID];\n}}\n\n"
    ));
    out.push_str(&format!(
        "const HChar* aiGetOpMnemonic(IROp op) {{\n    \
         return _irop_to_str[op-{iop}_INVALID];\n}}\n\n"
    ));

    out.push_str("const HChar* aiGetOpMnemonicAlt(IROp op) {\n    switch(op) {\n");
    for mnemonic in table.mnemonics() {
        out.push_str(&format!("        case {mnemonic}: return \"{mnemonic}\";\n"));
    }
    out.push_str(&format!("    }}\n    return \"{SWITCH_FALLBACK}\";\n}}\n"));
    out
}

fn vtypes_header(generation: &Generation, config: &EmitConfig) -> String {
    let guard = EmitConfig::header_guard(&config.vtypes_stem);
    let aty = &config.vtype_prefix;

    let mut out = banner(config);
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str("#include \"pub_tool_basics.h\"\n\n");
    out.push_str(&c_enum(generation.table.vtype_labels(), "AIVType"));
    out.push_str(&format!("#define AI_N_VTYPES ({aty}_LAST-{aty}_INVALID+1)\n\n"));
    out.push_str("const HChar* aiGetVTypeLabel(AIVType vty);\n\n");
    out.push_str(&format!("#endif /* {guard} */\n"));
    out
}

fn vtypes_source(generation: &Generation, config: &EmitConfig) -> String {
    let aty = &config.vtype_prefix;

    let mut out = banner(config);
    out.push_str(&format!("#include \"{}.h\"\n\n", config.vtypes_stem));
    out.push_str(&c_string_array(
        "_aivty_to_str",
        &range(aty),
        generation.table.vtype_labels(),
    ));
    out.push_str(&format!(
        "const HChar* aiGetVTypeLabel(AIVType vty) {{\n    \
         return _aivty_to_str[vty-{aty}_INVALID];\n}}\n"
    ));
    out
}

/// One CSV row per classified opcode, in opcode-id order.
fn classification_report(generation: &Generation) -> String {
    let mut out = String::from("mnemonic,vtype,parent,btype,nbits,nlanes,category,nops\n");
    for op in &generation.ops {
        let resolved = op.resolution.resolved;
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            op.mnemonic(),
            generation.table.vtype_label(op.vtype_id).unwrap_or_default(),
            op.resolution.parent(),
            resolved.base_type.letter(),
            resolved.bit_width,
            resolved.lane_count,
            op.classification.category,
            op.op_count,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::loader::OpcodeEnum;

    const SIGNATURES: &str = indoc! {"
        Iop_Add32Fx4,3,Ity_V128,Ity_V128,Ity_V128
        Iop_Not64,2,Ity_I64,Ity_I64
    "};

    fn emit_default(input: &str) -> Artifacts {
        let config = EmitConfig::default();
        let generation = Generation::run(input, None, &config);
        emit(&generation, &config, true).unwrap()
    }

    #[test]
    fn emits_all_files() {
        let artifacts = emit_default(SIGNATURES);
        let names: Vec<_> = artifacts.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "ai_classes.h",
                "ai_classes.c",
                "ai_vtypes.h",
                "ai_vtypes.c",
                "opclasses.csv"
            ]
        );
    }

    #[test]
    fn class_enum() {
        let artifacts = emit_default(SIGNATURES);
        let header = artifacts.get("ai_classes.h").unwrap();
        assert!(header.contains(indoc! {"
            typedef enum {
                Icls_INVALID=0x00,
                Icls_FStdArith,
                Icls_IBitwise,
                Icls_LAST
            } AIClass;
        "}));
        assert!(header.contains("#ifndef __AI_CLASSES_H\n#define __AI_CLASSES_H\n"));
        assert!(header.contains("#define AI_N_CLASSES (Icls_LAST-Icls_INVALID+1)"));
        assert!(header.trim_end().ends_with("#endif /* __AI_CLASSES_H */"));
    }

    #[test]
    fn opcount_rows_with_sentinels() {
        let artifacts = emit_default(SIGNATURES);
        let source = artifacts.get("ai_classes.c").unwrap();
        assert!(source.contains(indoc! {"
            static const AIOpCount _irop_to_aiopcount[Iop_LAST-Iop_INVALID+1] = {
                { (UChar)Icls_INVALID, (UChar)0 },  /* Iop_INVALID */
                { (UChar)Icls_FStdArith, (UChar)4 },  /* Iop_Add32Fx4 */
                { (UChar)Icls_IBitwise, (UChar)1 },  /* Iop_Not64 */
                { (UChar)Icls_LAST, (UChar)0 }  /* Iop_LAST */
            };
        "}));
    }

    #[test]
    fn mnemonic_switch() {
        let artifacts = emit_default(SIGNATURES);
        let source = artifacts.get("ai_classes.c").unwrap();
        assert!(source.contains("        case Iop_Add32Fx4: return \"Iop_Add32Fx4\";\n"));
        assert!(source.contains("        case Iop_LAST: return \"Iop_LAST\";\n"));
        assert!(source.contains("return \"!!!ERROR!!!\";"));
        assert_eq!(source.matches("case ").count(), 4);
    }

    #[test]
    fn vtype_tables() {
        let artifacts = emit_default(SIGNATURES);
        let header = artifacts.get("ai_vtypes.h").unwrap();
        assert!(header.contains("    Aty_F32x4,\n    Aty_I64x1,\n    Aty_LAST\n} AIVType;"));
        let source = artifacts.get("ai_vtypes.c").unwrap();
        assert!(source.contains("    \"Aty_INVALID\",\n    \"Aty_F32x4\","));
        assert!(source.contains("aiGetVTypeLabel(AIVType vty)"));
    }

    #[test]
    fn report_rows() {
        let artifacts = emit_default(SIGNATURES);
        assert_eq!(
            artifacts.get("opclasses.csv").unwrap(),
            indoc! {"
                mnemonic,vtype,parent,btype,nbits,nlanes,category,nops
                Iop_Add32Fx4,Aty_F32x4,Ity_V128,F,32,4,StdArith,4
                Iop_Not64,Aty_I64x1,Ity_I64,I,64,1,Bitwise,1
            "}
        );
    }

    #[test]
    fn report_is_optional() {
        let config = EmitConfig::default();
        let generation = Generation::run(SIGNATURES, None, &config);
        let artifacts = emit(&generation, &config, false).unwrap();
        assert_eq!(artifacts.files().len(), 4);
        assert_eq!(artifacts.get("opclasses.csv"), None);
    }

    #[test]
    fn missing_signature_row() {
        let config = EmitConfig::default();
        let listing = OpcodeEnum::parse("Iop_INVALID\nIop_Gone\nIop_Not64\nIop_LAST\n", "Iop")
            .unwrap();
        let generation = Generation::run(SIGNATURES, Some(&listing), &config);
        let artifacts = emit(&generation, &config, false).unwrap();
        let source = artifacts.get("ai_classes.c").unwrap();
        assert!(source.contains("    { (UChar)Icls_INVALID, (UChar)0 },  /* Iop_Gone */\n"));
    }

    #[test]
    fn op_count_must_fit_uchar() {
        let config = EmitConfig::default();
        // Avg over 512 lanes is 512 operations
        let generation =
            Generation::run("Iop_Avg8Ux512,3,Ity_V256,Ity_V256,Ity_V256\n", None, &config);
        assert_eq!(
            emit(&generation, &config, false),
            Err(EmitError::ValueOutOfRange {
                what: "op count",
                name: "Iop_Avg8Ux512".into(),
                value: 512,
            })
        );
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let written = emit_default(SIGNATURES).write_to(&out).unwrap();
        assert_eq!(written.len(), 5);
        let header = std::fs::read_to_string(out.join("ai_classes.h")).unwrap();
        assert!(header.contains("AIOpCount"));
    }
}

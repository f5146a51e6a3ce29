// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI for optables
//!
//! # Usage
//!
//! ```bash
//! # Tables only, into the current directory
//! optables all-opsigs.csv
//!
//! # Ids from the IR enum listing, plus the classification report
//! optables all-opsigs.csv --opcodes irops.lst --out-dir gen --report
//!
//! # Fail (exit 2) if any opcode was skipped or left unclassified
//! cat all-opsigs.csv | optables - --check
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use optables::{EmitConfig, Generation, GenerateError, GenerateResult, OpcodeEnum, emit};

#[derive(Parser, Debug)]
#[command(name = "optables", version, about = "IR opcode arithmetic-intensity table generator")]
struct Cli {
    /// Opcode signature table (`-` reads stdin)
    signatures: PathBuf,
    /// IR opcode enum listing; fixes the opcode ids
    #[arg(long)]
    opcodes: Option<PathBuf>,
    /// Directory the generated files are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Also write the per-opcode classification report
    #[arg(long)]
    report: bool,
    /// Exit with status 2 if any opcode was skipped or is unclassified
    #[arg(long)]
    check: bool,
    /// Prefix of class enumerators
    #[arg(long, default_value = "Icls")]
    class_prefix: String,
    /// Prefix of vector-type enumerators
    #[arg(long, default_value = "Aty")]
    vtype_prefix: String,
    /// Prefix of IR opcode enumerators
    #[arg(long, default_value = "Iop")]
    opcode_prefix: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> GenerateResult<ExitCode> {
    let config = EmitConfig {
        class_prefix: cli.class_prefix.clone(),
        vtype_prefix: cli.vtype_prefix.clone(),
        opcode_prefix: cli.opcode_prefix.clone(),
        ..EmitConfig::default()
    };

    let signatures = read_input(&cli.signatures)?;
    let opcodes = match &cli.opcodes {
        Some(path) => Some(OpcodeEnum::parse(&read_input(path)?, &config.opcode_prefix)?),
        None => None,
    };

    let generation = Generation::run(&signatures, opcodes.as_ref(), &config);
    let artifacts = emit(&generation, &config, cli.report)?;
    let written = artifacts.write_to(&cli.out_dir)?;

    let summary = generation.diagnostics.summary();
    eprintln!(
        "{} opcodes, {} classes, {} vector types, {} files written",
        generation.ops.len(),
        generation.registry.classes.len(),
        generation.registry.vtypes.len(),
        written.len()
    );
    eprintln!("{summary}");

    if cli.check && summary.has_gaps() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: &Path) -> GenerateResult<String> {
    let read = if path == Path::new("-") {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).map(|_| input)
    } else {
        fs::read_to_string(path)
    };
    read.map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

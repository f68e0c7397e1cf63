//! Command-line surface (§6): `cogen <file> [Δ-index …]`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Compiler generator for the cogen flowchart language: given a source
/// program and a set of static parameter indices, emits a specialiser
/// for it in source syntax.
#[derive(Debug, Parser)]
#[command(name = "cogen", version, about = "Generate a specialiser for a flowchart program")]
pub struct Cli {
    /// Source file to transform.
    pub file: PathBuf,

    /// 0-based indices into the program's declared parameters that
    /// make up the initial Δ (§9: Δ = {params\[i\] | i ∈ delta}).
    pub delta: Vec<usize>,

    /// Explicit configuration file, overriding discovery.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// What to print on stdout.
    #[arg(long, value_enum)]
    pub emit: Option<EmitKind>,

    /// Interpret the emitted extension program immediately, on the
    /// dynamic arguments given after `--`, and print its result.
    #[arg(long)]
    pub run: bool,

    /// Arguments for `--run`, read as signed integers and bound
    /// positionally to the extension program's declared parameters.
    #[arg(last = true)]
    pub run_args: Vec<i64>,
}

/// What the driver writes to stdout after a successful transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitKind {
    /// The extension program in source syntax (§6's default residual
    /// program shape).
    #[default]
    Source,
    /// The extension program's debug-formatted AST.
    Ast,
    /// The source file's token stream (§4.2), for debugging the lexer
    /// without running the transformer at all.
    Tokens,
}

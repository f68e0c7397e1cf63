//! The `cogen` command-line driver (§6).
//!
//! Wires the lexer/parser (`cogen-lex`, `cogen-par`), the transformer
//! (`cogen-core`) and a TOML configuration layer together behind a
//! `clap` front end, and maps every failure onto the three exit codes
//! §6 specifies: 0 on success, 2 on usage/I-O error, 1 on parse or
//! transform error.

pub mod cli;
pub mod config;
pub mod error;

use std::path::Path;

use cogen_core::{Delta, Interpreter, Transformer, Value};
use cogen_lex::Lexer;
use cogen_par::parse;
use cogen_util::diagnostic::{DiagnosticBuilder, SourceSnippet};
use cogen_util::SourceFile;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, EmitKind};
pub use config::DriverConfig;
pub use error::{DriverError, Result};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARSE_ERROR: i32 = 1;
pub const EXIT_USAGE_ERROR: i32 = 2;

/// Install a `tracing` subscriber whose verbosity is the CLI's `-v`
/// count, falling back to the config file's `verbose` field.
/// `COGEN_LOG` overrides both when set, per `EnvFilter`'s own syntax.
/// Safe to call more than once per process (tests do); a second
/// install is a no-op.
pub fn init_tracing(cli_verbose: u8, config: &DriverConfig) {
    let level = match cli_verbose.max(config.verbose.unwrap_or(0)) {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("COGEN_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the driver end to end, printing to stdout/stderr as §6
/// prescribes, and returning the process exit code.
pub fn run(cli: Cli) -> i32 {
    let config = match DriverConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_USAGE_ERROR;
        }
    };
    init_tracing(cli.verbose, &config);

    let emit = cli.emit.or(config.emit).unwrap_or_default();

    match run_inner(&cli.file, &cli.delta, emit, cli.run, &cli.run_args) {
        Ok(()) => EXIT_SUCCESS,
        Err(DriverExit::Usage(msg)) => {
            eprintln!("error: {msg}");
            EXIT_USAGE_ERROR
        }
        Err(DriverExit::Source(msg)) => {
            eprintln!("{msg}");
            EXIT_PARSE_ERROR
        }
    }
}

enum DriverExit {
    /// I/O or argument problems (§6: exit 2).
    Usage(String),
    /// Lex/parse/transform errors rooted in the source file (§6: exit 1).
    Source(String),
}

fn run_inner(
    path: &Path,
    delta_indices: &[usize],
    emit: EmitKind,
    run: bool,
    run_args: &[i64],
) -> std::result::Result<(), DriverExit> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| DriverExit::Usage(format!("reading {}: {e}", path.display())))?;

    if emit == EmitKind::Tokens {
        for token in Lexer::new(&contents).tokenize() {
            println!("{:?} {:?} {}", token.kind, token.literal, token.span);
        }
        return Ok(());
    }

    debug!(file = %path.display(), "parsing source");
    let (program, parse_errors) = parse(&contents);
    if let Some(first) = parse_errors.first() {
        let file = SourceFile::new(path.display().to_string(), contents);
        let snippet = SourceSnippet::from_span(&file, first.span());
        let diag = DiagnosticBuilder::error(first.to_string()).snippet(snippet).build();
        return Err(DriverExit::Source(diag.to_string()));
    }

    let delta = build_delta(&program.params, delta_indices)?;

    debug!(delta = %delta, "starting transform");
    let extension = Transformer::new(program)
        .transform(delta)
        .map_err(|e| DriverExit::Source(format!("error: {e}")))?;

    match emit {
        EmitKind::Source => print!("{extension}"),
        EmitKind::Ast => println!("{extension:#?}"),
    }

    if run {
        let args: Vec<Value> = run_args.iter().map(|&n| Value::Int(n)).collect();
        debug!(?args, "running extension program");
        let mut interp = Interpreter::with_args(&extension, &args)
            .map_err(|e| DriverExit::Source(format!("error: {e}")))?;
        let result = interp.run().map_err(|e| DriverExit::Source(format!("error: {e}")))?;
        println!("{result}");
    }
    Ok(())
}

/// Δ = {params\[i\] | i ∈ delta} (§9's authoritative reading of the
/// delta-index CLI argument).
fn build_delta(params: &[String], indices: &[usize]) -> std::result::Result<Delta, DriverExit> {
    let mut delta = Delta::new();
    for &i in indices {
        let name = params.get(i).ok_or_else(|| {
            DriverExit::Usage(format!(
                "Δ-index {i} out of range: program declares {} parameter(s)",
                params.len()
            ))
        })?;
        delta.insert(name.clone());
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_delta_selects_named_params() {
        let params = vec!["m".to_string(), "n".to_string()];
        let delta = build_delta(&params, &[0]).unwrap();
        assert!(delta.contains("m"));
        assert!(!delta.contains("n"));
    }

    #[test]
    fn build_delta_rejects_out_of_range_index() {
        let params = vec!["m".to_string()];
        assert!(build_delta(&params, &[5]).is_err());
    }

    #[test]
    fn run_inner_emits_source_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ack.cogen");
        std::fs::write(&path, "ack (m, n);\nack: return m + n;\n").unwrap();
        assert!(run_inner(&path, &[0], EmitKind::Source, false, &[]).is_ok());
    }

    #[test]
    fn run_inner_reports_missing_file_as_usage_error() {
        let err =
            run_inner(Path::new("/nonexistent/file.cogen"), &[], EmitKind::Source, false, &[]).unwrap_err();
        assert!(matches!(err, DriverExit::Usage(_)));
    }

    #[test]
    fn run_inner_reports_parse_error_as_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.cogen");
        std::fs::write(&path, "ack (m, n);\nack: if m = goto done;\n").unwrap();
        let err = run_inner(&path, &[], EmitKind::Source, false, &[]).unwrap_err();
        assert!(matches!(err, DriverExit::Source(_)));
    }

    #[test]
    fn run_inner_with_run_flag_interprets_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("add.cogen");
        std::fs::write(&path, "add (m, n);\nadd: return m + n;\n").unwrap();
        assert!(run_inner(&path, &[0], EmitKind::Source, true, &[7]).is_ok());
    }
}

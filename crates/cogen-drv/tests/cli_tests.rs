//! End-to-end tests for the `cogen` binary (§6).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn cogen_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cogen"))
}

#[test]
fn help_lists_usage() {
    Command::new(cogen_bin())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cogen"));
}

#[test]
fn transforms_ackermann_under_delta_m() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("ack.cogen"))
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("0-ack-m"))
        .stdout(predicate::str::contains("1-ack-m"))
        .stdout(predicate::str::contains("2:"));
}

#[test]
fn transforms_ackermann_under_empty_delta() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("ack.cogen"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0-ack"))
        .stdout(predicate::str::contains("2:"));
}

#[test]
fn emit_tokens_prints_token_stream() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("ack.cogen"))
        .arg("--emit")
        .arg("tokens")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ident"));
}

#[test]
fn emit_ast_prints_debug_form() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("ack.cogen"))
        .arg("0")
        .arg("--emit")
        .arg("ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program"));
}

#[test]
fn missing_file_exits_with_usage_code() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("does-not-exist.cogen"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn out_of_range_delta_index_exits_with_usage_code() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("ack.cogen"))
        .arg("99")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn run_flag_interprets_extension_and_prints_result() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("ack.cogen"))
        .arg("0")
        .arg("--run")
        .arg("--")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("0-ack-m"));
}

#[test]
fn parse_error_exits_with_code_one_and_shows_caret() {
    Command::new(cogen_bin())
        .arg(fixtures_dir().join("broken.cogen"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("^"));
}

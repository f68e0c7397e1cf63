//! Shared error taxonomy.
//!
//! Each phase (lex, parse, transform, interpret) defines its own
//! `thiserror` enum; this module defines the umbrella type that
//! composes them so the driver can propagate any phase's error
//! through a single `Result` without widening to `anyhow` until it
//! reaches `main`.

use thiserror::Error;

/// Errors that can escape `cogen-util` itself: source-map lookups on
/// spans that don't belong to the file being queried.
#[derive(Debug, Error)]
pub enum SpanError {
    #[error("span out of bounds: offset {offset} exceeds source length {len}")]
    OutOfBounds { offset: usize, len: usize },

    #[error("invalid line number {line}: file has {max_lines} lines")]
    InvalidLine { line: usize, max_lines: usize },
}

pub type SpanResult<T> = Result<T, SpanError>;

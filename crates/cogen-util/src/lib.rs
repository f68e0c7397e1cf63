//! Shared plumbing for the cogen workspace: source spans, caret-
//! underline diagnostics, a phase-agnostic error taxonomy, and a
//! single-threaded symbol interner.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Level, SourceSnippet};
pub use span::{SourceFile, Span};
pub use symbol::Symbol;

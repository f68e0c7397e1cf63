//! The driver's own error type, for configuration and usage failures
//! that happen before a source file is even parsed. Parse and
//! transform errors are rendered directly as strings at the call site
//! in [`crate::run_inner`] (they already carry their own diagnostic
//! formatting) rather than funnelled through this type. This crate's
//! own code stays on typed, `thiserror`-derived errors throughout;
//! `anyhow` is reserved for `main`'s top-level signature only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;

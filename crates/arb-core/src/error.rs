//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `ArbError` as one variant
//! where a core failure can surface through them.

use thiserror::Error;

/// The top-level error type for `arb-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum ArbError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `arb-core`.
pub type ArbResult<T> = Result<T, ArbError>;

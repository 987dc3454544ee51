//! Error types for arb-telemetry.

use thiserror::Error;

/// Errors that can occur when publishing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Alias for `Result<T, TelemetryError>`.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

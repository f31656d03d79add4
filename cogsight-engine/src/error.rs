//! Engine error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.
//! Arithmetic guards (division by zero in ratio computations) are not
//! errors anywhere in this crate; they resolve to a 0 sentinel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no usable rows remain after parsing")]
    EmptyDataset,

    #[error("invalid filter: {reason}")]
    InvalidFilter { reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

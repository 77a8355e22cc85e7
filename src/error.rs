//! Error types for the resampling engine.
//!
//! Boundary code (reading sources, writing tables, the CLI) reports through
//! `anyhow`; the engine itself fails only with [`EngineError`].

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{0:?} is not a valid time section (expected one of original, hour, day, week, month, year)")]
    InvalidGranularity(String),

    #[error("sampling interval must be between 1 and 60 minutes, got {0}")]
    InvalidSamplingInterval(u32),

    #[error("reading at {timestamp} has {found} values, expected {expected}")]
    FieldCountMismatch {
        timestamp: String,
        expected: usize,
        found: usize,
    },
}

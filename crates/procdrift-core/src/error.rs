//! Error types for process drift analysis
//!
//! Provides a unified error type for all procdrift crates.
//!
//! A metrics-phase timeout is deliberately *not* an error variant: it is a
//! degraded terminal status surfaced through polling (see the run
//! controller), never raised to the caller.

use thiserror::Error;

/// Core error type for drift detection operations
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognized configuration input (window unit, read-as mode,
    /// detector kind, metric kind). Surfaced before any concurrent work.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// IO error (metric log and summary files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for an unrecognized window unit policy
    pub fn unknown_window_unit(unit: &str) -> Self {
        Self::Configuration(format!("Unknown window unit policy: {unit:?}"))
    }

    /// Create an error for an unrecognized read-as mode
    pub fn unknown_read_as(mode: &str) -> Self {
        Self::Configuration(format!("Unknown read-as mode: {mode:?}"))
    }

    /// Create an error for an unrecognized detector kind
    pub fn unknown_detector(kind: &str) -> Self {
        Self::Configuration(format!("Unknown detector kind: {kind:?}"))
    }

    /// Create an error for an unrecognized metric kind
    pub fn unknown_metric(kind: &str) -> Self {
        Self::Configuration(format!("Unknown metric kind: {kind:?}"))
    }

    /// Create an error for a stream item missing a timestamp under a
    /// time-based window policy
    pub fn missing_timestamp(offset: u64) -> Self {
        Self::InvalidInput(format!(
            "Stream item at offset {offset} has no timestamp; time-based windowing requires one"
        ))
    }
}

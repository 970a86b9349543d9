//! Error types for the caffeine_core library.

use chrono::{DateTime, Duration, Utc};
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for caffeine_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested window is empty or inverted (`end <= start`)
    #[error("invalid range: end {end} is not after start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Sampling step is zero or negative
    #[error("invalid resolution: {0}")]
    InvalidResolution(Duration),

    /// Half-life is zero or negative
    #[error("invalid half-life: {0}")]
    InvalidHalfLife(Duration),

    /// Timestamp could not be aligned to a resolution boundary
    #[error("rounding error: {0}")]
    Rounding(#[from] chrono::RoundingError),

    /// User-supplied value could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error was caused by bad caller input rather than a fault
    /// on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRange { .. } | Error::Parse(_))
    }
}

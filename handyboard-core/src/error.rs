//! Error types for handyboard-core

use thiserror::Error;

/// Main error type for the handyboard-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation payload was null
    #[error("validation payload is missing")]
    MissingPayload,

    /// Timestamp could not be parsed where a valid one is required
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Result type alias for handyboard-core
pub type Result<T> = std::result::Result<T, Error>;

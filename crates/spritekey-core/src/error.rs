//! Error types for SpriteKey.

use thiserror::Error;

/// Main error type for SpriteKey operations.
#[derive(Error, Debug)]
pub enum SpriteKeyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Raster context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Result type alias for SpriteKey operations.
pub type Result<T> = std::result::Result<T, SpriteKeyError>;

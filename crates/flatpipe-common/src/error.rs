//! Error types shared across the Flatpipe workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, FlatpipeError>;

/// Shared error type for the common crate
#[derive(Error, Debug)]
pub enum FlatpipeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Data shape error: {0}")]
    DataShape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

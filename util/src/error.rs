//! Error types for fixture helpers

use thiserror::Error;

/// Error type for fixture operations
#[derive(Debug, Error)]
pub enum UtilError {
    /// Writing a fixture to disk failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// The requested fixture cannot be represented
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type for fixture operations
pub type UtilResult<T> = std::result::Result<T, UtilError>;

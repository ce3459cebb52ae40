//! Cache and storage error types.

use thiserror::Error;

/// Errors from the storage boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying storage I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

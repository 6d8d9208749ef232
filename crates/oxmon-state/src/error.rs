//! Error types for oxmon-state

use thiserror::Error;

/// Errors that can occur at the persistence boundary
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem I/O error
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Value was not valid UTF-8 / not decodable
    #[error("stored value for key '{key}' is not decodable")]
    Corrupt { key: String },

    /// Backend-specific failure (quota exceeded, storage disabled, ...)
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

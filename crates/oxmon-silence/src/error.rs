//! Error types for silence-window lifecycle operations.

use thiserror::Error;

/// Errors from the backend silence-window API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request never completed (connection refused, timeout, DNS, ...)
    #[error("request failed: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be decoded
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Result type for backend API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors from the edit-window workflow.
#[derive(Error, Debug)]
pub enum SilenceError {
    /// Payload rejected before any network call was made
    #[error("invalid window payload: {0}")]
    Validation(String),

    /// The backend call that aborts the operation failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for lifecycle operations.
pub type SilenceResult<T> = std::result::Result<T, SilenceError>;

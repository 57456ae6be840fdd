//! Error types for the HTTP engine adapter.

use thiserror::Error;

use qdice_view::ViewError;

/// Result type for HTTP engine operations.
pub type HttpEngineResult<T> = Result<T, HttpEngineError>;

/// Errors that can occur when talking to the engine service.
#[derive(Debug, Error)]
pub enum HttpEngineError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Base URL could not be used.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl From<HttpEngineError> for ViewError {
    fn from(e: HttpEngineError) -> Self {
        ViewError::Transport(e.to_string())
    }
}

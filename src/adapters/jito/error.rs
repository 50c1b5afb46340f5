//! Jito Error Types

use thiserror::Error;

use crate::ports::relay::RelayError;

/// Errors that can occur during Jito bundle operations
#[derive(Error, Debug, Clone)]
pub enum JitoError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Block Engine API error
    #[error("Block Engine error: {message} (code: {code})")]
    ApiError { code: i32, message: String },

    /// Non-success HTTP status without a JSON-RPC body
    #[error("Block Engine returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Invalid bundle (empty, too large, etc.)
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// Transaction could not be serialized
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Network/connection error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Maximum retries exceeded
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl JitoError {
    /// Transport-level failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JitoError::HttpError(_)
                | JitoError::Timeout
                | JitoError::NetworkError(_)
                | JitoError::RateLimited
        )
    }
}

impl From<reqwest::Error> for JitoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JitoError::Timeout
        } else if err.is_connect() {
            JitoError::NetworkError(err.to_string())
        } else {
            JitoError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JitoError {
    fn from(err: serde_json::Error) -> Self {
        JitoError::SerializationError(err.to_string())
    }
}

impl From<JitoError> for RelayError {
    fn from(err: JitoError) -> Self {
        match err {
            JitoError::ApiError { .. } | JitoError::HttpStatus { .. } => {
                RelayError::Rejected(err.to_string())
            }
            JitoError::InvalidBundle(msg) | JitoError::InvalidTransaction(msg) => {
                RelayError::InvalidBundle(msg)
            }
            other => RelayError::Transport(other.to_string()),
        }
    }
}

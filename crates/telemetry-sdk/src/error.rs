//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation in the SDK. Validation failures (HTTP 422) keep their
//! structured payload so callers can show which field was rejected.

use telemetry_models::HttpValidationError;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid configuration (e.g. a base URL that cannot carry a path).
    #[error("configuration error: {0}")]
    Config(String),

    /// The service rejected the request parameters (HTTP 422).
    #[error("validation error: {0}")]
    Validation(HttpValidationError),

    /// The service answered with an undocumented non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SdkError {
    /// The structured payload, when the service rejected the input.
    pub fn validation(&self) -> Option<&HttpValidationError> {
        match self {
            SdkError::Validation(detail) => Some(detail),
            _ => None,
        }
    }
}

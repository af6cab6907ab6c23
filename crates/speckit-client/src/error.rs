//! API client error types.

/// Errors from API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The endpoint returned a status the caller did not accept.
    #[error("{endpoint} returned {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body is not the JSON the caller expected.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

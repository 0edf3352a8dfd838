//! Error types for HTTP API calls.

use thiserror::Error;

/// Errors returned by [`MonitorApi`](super::MonitorApi) calls.
///
/// Status codes are not interpreted: a 401 and a 500 both surface as
/// `Status`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// Server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Server answered 200 with an `error` payload.
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout_seconds)
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

//! Failure taxonomy for platform calls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL cannot be parsed.
    #[error("invalid platform URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    /// Connection refused, DNS, TLS and other transport failures.
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response from the platform.
    #[error("platform returned {status} for {path}: {message}")]
    Upstream {
        path: String,
        status: u16,
        message: String,
    },

    #[error("could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status for upstream errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Transcode backend error types.

use thiserror::Error;

/// Result type for backend operations.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Errors that can occur while talking to the transcoding backend.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The backend rejected the request. Code and message are verbatim.
    #[error("API call failed with status {status}, code '{code}' and message '{message}'")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscodeError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// HTTP status reported by the backend, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            TranscodeError::Api { status, .. } => Some(*status),
            TranscodeError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The backend answered, but not in the shape its contract promises.
    pub fn is_malformed(&self) -> bool {
        matches!(self, TranscodeError::InvalidResponse(_) | TranscodeError::Json(_))
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranscodeError::Network(_) => true,
            TranscodeError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

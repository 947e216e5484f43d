//! Backend API errors

use thiserror::Error;

/// Errors returned by backend API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to connect to the backend
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request could not be sent or its body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Backend rejected the credentials; the credential store has been cleared
    #[error("Not authenticated")]
    Unauthorized,

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Parameters rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Whether repeating the same request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::RateLimited | Self::Timeout => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<domain::DomainError> for ApiError {
    fn from(err: domain::DomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Backend rejected the credentials
    #[error("Not authenticated")]
    Unauthorized,

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Backend or transport failure
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Parameters rejected before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bulk action requested with an empty selection
    #[error("No inbox items selected")]
    NothingSelected,

    /// Page outside `1..=page_count`
    #[error("Page {page} is out of range (1-{page_count})")]
    InvalidPage { page: u32, page_count: u32 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ExternalService(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_is_transparent() {
        let err: ApplicationError = DomainError::InvalidCoordinates.into();
        assert_eq!(err.to_string(), DomainError::InvalidCoordinates.to_string());
    }

    #[test]
    fn retryable_errors() {
        assert!(ApplicationError::RateLimited.is_retryable());
        assert!(ApplicationError::ExternalService("502".into()).is_retryable());
        assert!(!ApplicationError::NothingSelected.is_retryable());
        assert!(!ApplicationError::Unauthorized.is_retryable());
    }

    #[test]
    fn invalid_page_message() {
        let err = ApplicationError::InvalidPage {
            page: 4,
            page_count: 3,
        };
        assert_eq!(err.to_string(), "Page 4 is out of range (1-3)");
    }
}

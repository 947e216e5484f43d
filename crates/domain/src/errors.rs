//! Domain-level errors

use thiserror::Error;

/// Errors raised while constructing or validating domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required field was empty
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Coordinates outside the valid WGS84 range
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

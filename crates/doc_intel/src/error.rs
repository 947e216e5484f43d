//! Analysis errors

use thiserror::Error;

/// Errors from a document analysis session
///
/// `Http` and `Transport` are returned before any event is read. The others
/// reach the caller through [`crate::AnalysisObserver::on_error`] or from
/// [`crate::DocIntelClient::analyze_documents`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Backend answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Request could not be sent
    #[error("Analysis request failed: {0}")]
    Transport(String),

    /// Reading the event stream failed part way
    #[error("Analysis stream failed: {0}")]
    Stream(String),

    /// Backend reported an error event
    #[error("{message}")]
    Server { message: String },

    /// Stream closed without a complete or error event
    #[error("Analysis stream ended without a result")]
    StreamEnded,

    /// No terminal event within the configured completion timeout
    #[error("Analysis timed out")]
    Timeout,

    /// Caller cancelled the session
    #[error("Analysis cancelled")]
    Cancelled,

    /// Request or configuration rejected before sending
    #[error("Invalid analysis request: {0}")]
    InvalidRequest(String),
}

impl AnalysisError {
    /// Status code for HTTP failures
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<domain::DomainError> for AnalysisError {
    fn from(err: domain::DomainError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

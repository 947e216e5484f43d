//! Analysis client configuration

use std::time::Duration;

use domain::{AnalysisRequest, DEFAULT_MAX_DOCUMENTS};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Configuration for the document-intelligence client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Base URL of the analysis service; `/analyze` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request defaults used by [`AnalysisConfig::request_for`]
    #[serde(default = "default_max_documents")]
    pub max_documents: u32,

    #[serde(default = "default_true")]
    pub include_drawings: bool,

    #[serde(default)]
    pub skip_cache: bool,

    #[serde(default)]
    pub priority_only: bool,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound for [`crate::DocIntelClient::analyze_documents`]
    ///
    /// The streaming call itself never times out.
    #[serde(default)]
    pub completion_timeout_secs: Option<u64>,

    /// Longest event-stream line accepted before the session fails
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

const fn default_max_documents() -> u32 {
    DEFAULT_MAX_DOCUMENTS
}

const fn default_true() -> bool {
    true
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

/// Complete payloads can inline base64 drawings
const fn default_max_line_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_documents: default_max_documents(),
            include_drawings: true,
            skip_cache: false,
            priority_only: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            completion_timeout_secs: None,
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Full URL of the streaming endpoint
    #[must_use]
    pub fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn completion_timeout(&self) -> Option<Duration> {
        self.completion_timeout_secs.map(Duration::from_secs)
    }

    /// Build a request for `application_number` with the configured defaults
    pub fn request_for(&self, application_number: &str) -> Result<AnalysisRequest, AnalysisError> {
        Ok(AnalysisRequest::new(application_number)?
            .with_max_documents(self.max_documents)
            .with_drawings(self.include_drawings)
            .with_skip_cache(self.skip_cache)
            .with_priority_only(self.priority_only))
    }
}

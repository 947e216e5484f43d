//! Document-intelligence analysis entities
//!
//! An [`AnalysisRequest`] names the application whose documents should be
//! analysed. While the backend works it emits [`ProgressEvent`]s, and a
//! successful run ends with exactly one [`AnalysisResult`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;
use crate::DomainError;

/// Number of documents analysed when the caller does not say otherwise
pub const DEFAULT_MAX_DOCUMENTS: u32 = 50;

/// Request to analyse the document set of one planning application
///
/// Immutable once issued: the builder methods consume and return `Self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    application_number: String,
    max_documents: u32,
    include_drawings: bool,
    skip_cache: bool,
    priority_only: bool,
}

impl AnalysisRequest {
    /// Create a request with default options
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyField` if the application number is blank.
    pub fn new(application_number: impl Into<String>) -> Result<Self, DomainError> {
        let application_number = application_number.into().trim().to_string();
        if application_number.is_empty() {
            return Err(DomainError::EmptyField("application number"));
        }
        Ok(Self {
            application_number,
            max_documents: DEFAULT_MAX_DOCUMENTS,
            include_drawings: true,
            skip_cache: false,
            priority_only: false,
        })
    }

    #[must_use]
    pub const fn with_max_documents(mut self, max_documents: u32) -> Self {
        self.max_documents = max_documents;
        self
    }

    /// Whether drawings should go through image extraction
    #[must_use]
    pub const fn with_drawings(mut self, include: bool) -> Self {
        self.include_drawings = include;
        self
    }

    /// Bypass any cached analysis on the backend
    #[must_use]
    pub const fn with_skip_cache(mut self, skip: bool) -> Self {
        self.skip_cache = skip;
        self
    }

    /// Restrict the run to the documents the backend ranks as priority
    #[must_use]
    pub const fn with_priority_only(mut self, priority_only: bool) -> Self {
        self.priority_only = priority_only;
        self
    }

    #[must_use]
    pub fn application_number(&self) -> &str {
        &self.application_number
    }

    #[must_use]
    pub const fn max_documents(&self) -> u32 {
        self.max_documents
    }

    #[must_use]
    pub const fn include_drawings(&self) -> bool {
        self.include_drawings
    }

    #[must_use]
    pub const fn skip_cache(&self) -> bool {
        self.skip_cache
    }

    #[must_use]
    pub const fn priority_only(&self) -> bool {
        self.priority_only
    }
}

/// Phase of backend processing reported by a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStage {
    Connecting,
    Retrieving,
    Downloading,
    Analyzing,
    Summarizing,
    Complete,
    Error,
    /// Any stage label this client does not know
    #[default]
    Unknown,
}

impl AnalysisStage {
    /// Stages that mark a payload as a progress update
    pub const PROGRESS_STAGES: [Self; 6] = [
        Self::Connecting,
        Self::Retrieving,
        Self::Downloading,
        Self::Analyzing,
        Self::Summarizing,
        Self::Complete,
    ];

    /// Parse a wire label, mapping anything unrecognised to `Unknown`
    #[must_use]
    pub fn from_wire(label: &str) -> Self {
        match label {
            "connecting" => Self::Connecting,
            "retrieving" => Self::Retrieving,
            "downloading" => Self::Downloading,
            "analyzing" => Self::Analyzing,
            "summarizing" => Self::Summarizing,
            "complete" => Self::Complete,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_progress_stage(&self) -> bool {
        Self::PROGRESS_STAGES.contains(self)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Retrieving => "retrieving",
            Self::Downloading => "downloading",
            Self::Analyzing => "analyzing",
            Self::Summarizing => "summarizing",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised labels, `null` and non-string values decode as `Unknown`
impl<'de> Deserialize<'de> for AnalysisStage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or(Self::Unknown, Self::from_wire))
    }
}

/// Point-in-time snapshot of an in-flight analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[serde(default)]
    pub stage: AnalysisStage,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub message: String,
    /// Percentage complete as sent by the backend
    #[serde(default, deserialize_with = "lenient::number")]
    pub progress: f64,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub current_document: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub documents_total: u32,
    #[serde(default, alias = "documentsCompleted", deserialize_with = "lenient::count")]
    pub documents_complete: u32,
}

impl ProgressEvent {
    /// Percentage clamped to 0..=100
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.progress.is_nan() {
            return 0.0;
        }
        self.progress.clamp(0.0, 100.0)
    }
}

/// An image produced while analysing a document (usually from a drawing)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedImage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Base64 payload when the backend inlines the image
    #[serde(default)]
    pub data: Option<String>,
}

/// Analysis of a single document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    #[serde(default, alias = "name", deserialize_with = "lenient::null_as_default")]
    pub document_name: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_facts: KeyFacts,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub images: Vec<ExtractedImage>,
}

/// Facts extracted from one document
///
/// The service sends either named facts (`{"height": "9.5m"}`) or a plain
/// list (`["9.5m high"]`). Any other value is kept as a one-item list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyFacts {
    Named(BTreeMap<String, Value>),
    Listed(Vec<Value>),
}

impl Default for KeyFacts {
    fn default() -> Self {
        Self::Named(BTreeMap::new())
    }
}

impl KeyFacts {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Named(facts) => facts.len(),
            Self::Listed(facts) => facts.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a named fact; listed facts have no names
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Named(facts) => facts.get(name),
            Self::Listed(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for KeyFacts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(facts) => Self::Named(facts.into_iter().collect()),
            Value::Array(facts) => Self::Listed(facts),
            Value::Null => Self::default(),
            other => Self::Listed(vec![other]),
        })
    }
}

/// Terminal successful outcome of an analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub application_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub documents_found: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub documents_analyzed: u32,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub analyses: Vec<DocumentAnalysis>,
    #[serde(default, alias = "overallSummary", deserialize_with = "lenient::optional_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub key_findings: Vec<String>,
    /// As sent; fractional values are kept
    #[serde(default, alias = "processingTime", deserialize_with = "lenient::number")]
    pub processing_time_ms: f64,
    #[serde(default, alias = "fromCache", deserialize_with = "lenient::null_as_default")]
    pub cached: bool,
}

impl AnalysisResult {
    /// Total number of images across all document analyses
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.analyses.iter().map(|a| a.images.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = AnalysisRequest::new("FW24A/0123").unwrap();
        assert_eq!(request.application_number(), "FW24A/0123");
        assert_eq!(request.max_documents(), DEFAULT_MAX_DOCUMENTS);
        assert!(request.include_drawings());
        assert!(!request.skip_cache());
        assert!(!request.priority_only());
    }

    #[test]
    fn request_rejects_blank_application_number() {
        assert_eq!(
            AnalysisRequest::new("   "),
            Err(DomainError::EmptyField("application number"))
        );
    }

    #[test]
    fn request_builders_apply() {
        let request = AnalysisRequest::new(" 2460123 ")
            .unwrap()
            .with_max_documents(5)
            .with_drawings(false)
            .with_skip_cache(true)
            .with_priority_only(true);
        assert_eq!(request.application_number(), "2460123");
        assert_eq!(request.max_documents(), 5);
        assert!(!request.include_drawings());
        assert!(request.skip_cache());
        assert!(request.priority_only());
    }

    #[test]
    fn stage_wire_labels() {
        assert_eq!(AnalysisStage::from_wire("analyzing"), AnalysisStage::Analyzing);
        assert_eq!(AnalysisStage::from_wire("queued"), AnalysisStage::Unknown);
        assert!(AnalysisStage::Complete.is_progress_stage());
        assert!(!AnalysisStage::Error.is_progress_stage());
        assert!(!AnalysisStage::Unknown.is_progress_stage());
    }

    #[test]
    fn unknown_stage_deserializes() {
        let event: ProgressEvent = serde_json::from_str(r#"{"stage":"queued"}"#).unwrap();
        assert_eq!(event.stage, AnalysisStage::Unknown);
    }

    #[test]
    fn progress_event_from_camel_case() {
        let event: ProgressEvent = serde_json::from_str(
            r#"{"stage":"analyzing","message":"Reading","progress":42,"currentDocument":"site.pdf","documentsTotal":10,"documentsComplete":4}"#,
        )
        .unwrap();
        assert_eq!(event.stage, AnalysisStage::Analyzing);
        assert!((event.percent() - 42.0).abs() < f64::EPSILON);
        assert_eq!(event.current_document.as_deref(), Some("site.pdf"));
        assert_eq!(event.documents_total, 10);
        assert_eq!(event.documents_complete, 4);
    }

    #[test]
    fn percent_is_clamped() {
        let event = ProgressEvent {
            progress: 140.0,
            ..Default::default()
        };
        assert!((event.percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn result_tolerates_loose_numbers_and_nulls() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"analyses":[],"processingTime":5.12,"documentsFound":null,"documentsAnalyzed":2.0,"keyFindings":null,"cached":null}"#,
        )
        .unwrap();
        assert!((result.processing_time_ms - 5.12).abs() < f64::EPSILON);
        assert_eq!(result.documents_found, 0);
        assert_eq!(result.documents_analyzed, 2);
        assert!(result.key_findings.is_empty());
        assert!(!result.cached);
    }

    #[test]
    fn key_facts_accept_lists() {
        let analysis: DocumentAnalysis =
            serde_json::from_str(r#"{"documentName":"a.pdf","keyFacts":["9.5m high"]}"#).unwrap();
        assert_eq!(
            analysis.key_facts,
            KeyFacts::Listed(vec![serde_json::json!("9.5m high")])
        );
        assert_eq!(analysis.key_facts.len(), 1);
        assert_eq!(analysis.key_facts.get("height"), None);

        let analysis: DocumentAnalysis =
            serde_json::from_str(r#"{"documentName":"b.pdf","keyFacts":null}"#).unwrap();
        assert!(analysis.key_facts.is_empty());
    }

    #[test]
    fn progress_tolerates_nulls_and_odd_stages() {
        let event: ProgressEvent = serde_json::from_str(
            r#"{"stage":7,"message":null,"progress":"12.5","documentsTotal":null,"documentsComplete":1.0,"currentDocument":42}"#,
        )
        .unwrap();
        assert_eq!(event.stage, AnalysisStage::Unknown);
        assert!(event.message.is_empty());
        assert!((event.percent() - 12.5).abs() < f64::EPSILON);
        assert_eq!(event.documents_total, 0);
        assert_eq!(event.documents_complete, 1);
        assert_eq!(event.current_document.as_deref(), Some("42"));
    }

    #[test]
    fn result_tolerates_sparse_payload() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"analyses":[{"documentName":"Drawings.pdf","images":[{"page":2}],"keyFacts":{"height":"9.5m"}}],"overallSummary":"Two storey extension","cached":true}"#,
        )
        .unwrap();
        assert_eq!(result.analyses.len(), 1);
        assert_eq!(result.summary.as_deref(), Some("Two storey extension"));
        assert_eq!(result.image_count(), 1);
        assert!(result.cached);
        assert_eq!(
            result.analyses[0].key_facts.get("height"),
            Some(&serde_json::json!("9.5m"))
        );
    }
}

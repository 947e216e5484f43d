//! Classification of analysis stream payloads
//!
//! The service does not always send an `event:` line, so a payload without
//! one is sorted by its fields. An explicit event type always wins.
//!
//! Once a payload has a kind it is always delivered. Fields that do not fit
//! the typed event are dropped and the rest are kept.

use domain::{AnalysisResult, AnalysisStage, ProgressEvent};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

const UNKNOWN_ERROR: &str = "Unknown analysis error";

/// One meaningful event from the analysis stream
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Progress(ProgressEvent),
    Complete(AnalysisResult),
    Failed(String),
}

impl AnalysisEvent {
    /// Complete and failed events end the session
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Progress,
    Complete,
    Failed,
}

/// Classify a decoded payload
///
/// Returns `None` only for payloads that match no kind.
#[must_use]
pub fn classify(event_type: Option<&str>, payload: &Value) -> Option<AnalysisEvent> {
    let kind = match event_type {
        Some("progress") => Kind::Progress,
        Some("complete") => Kind::Complete,
        Some("error") => Kind::Failed,
        _ => kind_from_fields(payload)?,
    };

    match kind {
        Kind::Progress => Some(AnalysisEvent::Progress(convert(payload))),
        Kind::Complete => Some(AnalysisEvent::Complete(convert(payload))),
        Kind::Failed => Some(AnalysisEvent::Failed(error_message(payload))),
    }
}

fn kind_from_fields(payload: &Value) -> Option<Kind> {
    let stage = payload.get("stage").and_then(Value::as_str).map(AnalysisStage::from_wire);

    if payload.get("progress").is_some_and(Value::is_number)
        || stage.is_some_and(|s| s.is_progress_stage())
    {
        Some(Kind::Progress)
    } else if payload.get("analyses").is_some_and(Value::is_array) {
        Some(Kind::Complete)
    } else if payload.get("error").is_some() || stage == Some(AnalysisStage::Error) {
        Some(Kind::Failed)
    } else {
        None
    }
}

/// Human-readable message of an error payload
#[must_use]
pub fn error_message(payload: &Value) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| {
            payload
                .get(*key)
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
        })
        .map_or_else(|| UNKNOWN_ERROR.to_string(), str::to_string)
}

fn convert<T: DeserializeOwned + Default>(payload: &Value) -> T {
    T::deserialize(payload).unwrap_or_else(|e| {
        debug!(error = %e, "Analysis payload partly unreadable, keeping the fields that fit");
        salvage(payload)
    })
}

/// Rebuild `T` from the fields of `payload` that deserialize on their own
fn salvage<T: DeserializeOwned + Default>(payload: &Value) -> T {
    let Value::Object(fields) = payload else {
        return T::default();
    };

    let mut kept = Map::new();
    for (key, value) in fields {
        kept.insert(key.clone(), value.clone());
        if T::deserialize(&Value::Object(kept.clone())).is_err() {
            debug!(field = %key, "Dropping unreadable analysis field");
            kept.remove(key);
        }
    }
    T::deserialize(&Value::Object(kept)).unwrap_or_default()
}

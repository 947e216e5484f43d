//! Streaming document-intelligence client
//!
//! The backend analyses the documents lodged against a planning application
//! and reports back over Server-Sent Events: any number of progress frames,
//! then either a complete result or an error. [`DocIntelClient`] opens the
//! stream, frames it with [`SseDecoder`], sorts each payload with
//! [`classify`] and hands the outcome to an [`AnalysisObserver`].

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod observer;
pub mod session;
pub mod sse;

pub use classify::{AnalysisEvent, classify};
pub use client::DocIntelClient;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use observer::{AnalysisObserver, Callbacks};
pub use session::StreamSession;
pub use sse::{SseDecoder, SseFrame};

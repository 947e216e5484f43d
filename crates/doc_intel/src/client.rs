//! Streaming client for the document-intelligence endpoint
//!
//! # Examples
//!
//! ```ignore
//! use doc_intel::{AnalysisConfig, Callbacks, DocIntelClient};
//!
//! let client = DocIntelClient::new(AnalysisConfig::default(), credentials)?;
//! let request = AnalysisRequest::new("FW24A/0123")?;
//! let mut callbacks = Callbacks::new(
//!     |result| println!("{:?}", result.summary),
//!     |error| eprintln!("{error}"),
//! );
//! client
//!     .analyze_documents_streaming(&request, &mut callbacks, None)
//!     .await?;
//! ```

use std::time::Duration;

use backend_api::{SharedCredentials, http::authorize};
use domain::{AnalysisRequest, AnalysisResult, ProgressEvent};
use futures::StreamExt;
use reqwest::{Client, StatusCode, header::ACCEPT};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::{AnalysisConfig, AnalysisError, AnalysisObserver, SseDecoder, StreamSession};

const EVENT_STREAM: &str = "text/event-stream";

/// Client for the streaming analysis endpoint
#[derive(Debug, Clone)]
pub struct DocIntelClient {
    http: Client,
    config: AnalysisConfig,
    credentials: SharedCredentials,
}

impl DocIntelClient {
    /// Create a client reading credentials from the shared store
    ///
    /// The reqwest client has a connect timeout but no overall timeout:
    /// analyses can stream for minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the reqwest client cannot be built.
    pub fn new(config: AnalysisConfig, credentials: SharedCredentials) -> Result<Self, AnalysisError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("planwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        debug!(url = %config.analyze_url(), "Initialized analysis client");

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run one analysis, reporting events to `observer` as they arrive
    ///
    /// Returns `Err` only when the request fails before any event is read:
    /// the request could not be sent or the service answered with a
    /// non-success status. From then on every outcome goes to the observer,
    /// which hears exactly one of `on_complete` / `on_error` unless the token
    /// is cancelled, in which case it hears nothing more and the call returns
    /// `Ok(())`.
    #[instrument(
        skip(self, observer, cancel),
        fields(application_number = %request.application_number())
    )]
    pub async fn analyze_documents_streaming<O>(
        &self,
        request: &AnalysisRequest,
        observer: &mut O,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), AnalysisError>
    where
        O: AnalysisObserver + ?Sized,
    {
        let mut session = StreamSession::new(request.clone(), cancel);

        let builder = self
            .http
            .get(self.config.analyze_url())
            .query(&query_pairs(request))
            .header(ACCEPT, EVENT_STREAM);
        let builder = authorize(builder, &self.credentials.snapshot());

        let response = tokio::select! {
            biased;
            () = session.token().cancelled() => {
                debug!("Analysis cancelled before response");
                return Ok(());
            },
            response = builder.send() => {
                response.map_err(|e| AnalysisError::Transport(e.to_string()))?
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                () = session.token().cancelled() => {
                    debug!("Analysis cancelled while reading error body");
                    return Ok(());
                },
                body = response.text() => body.unwrap_or_default(),
            };
            return Err(status_error(status, &body));
        }
        debug!(status = %status, "Analysis stream opened");

        let mut decoder = SseDecoder::with_max_line_len(self.config.max_line_bytes);
        let mut chunks = response.bytes_stream();

        loop {
            let next = tokio::select! {
                biased;
                () = session.token().cancelled() => {
                    debug!(events = session.events_seen(), "Analysis cancelled");
                    return Ok(());
                },
                next = chunks.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    trace!(len = bytes.len(), "Analysis chunk");
                    for frame in decoder.feed(&bytes) {
                        if session.process(&frame, observer).is_break() {
                            return Ok(());
                        }
                    }
                    if let Some(limit) = decoder.overflow() {
                        warn!(limit, "Analysis stream line too long");
                        session.fail(
                            AnalysisError::Stream(format!("event line exceeds {limit} bytes")),
                            observer,
                        );
                        return Ok(());
                    }
                },
                Some(Err(e)) => {
                    warn!(error = %e, "Analysis stream broke");
                    session.fail(AnalysisError::Stream(e.to_string()), observer);
                    return Ok(());
                },
                None => break,
            }
        }

        let tail_ended = decoder
            .finish()
            .is_some_and(|frame| session.process(&frame, observer).is_break());
        if tail_ended {
            return Ok(());
        }

        warn!(events = session.events_seen(), "Analysis stream ended without a result");
        session.fail(AnalysisError::StreamEnded, observer);
        Ok(())
    }

    /// Run one analysis to completion and return its result
    ///
    /// Progress events are forwarded to `progress` when given. The
    /// configured completion timeout, if any, bounds the whole call.
    #[instrument(skip(self, progress, cancel), fields(application_number = %request.application_number()))]
    pub async fn analyze_documents(
        &self,
        request: &AnalysisRequest,
        progress: Option<UnboundedSender<ProgressEvent>>,
        cancel: Option<&CancellationToken>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut collector = Collector {
            progress,
            outcome: None,
        };

        let run = self.analyze_documents_streaming(request, &mut collector, cancel);
        match self.config.completion_timeout() {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| AnalysisError::Timeout)??,
            None => run.await?,
        }

        collector
            .outcome
            .unwrap_or(Err(AnalysisError::Cancelled))
    }
}

/// Query string of the analyze endpoint
fn query_pairs(request: &AnalysisRequest) -> [(&'static str, String); 5] {
    [
        ("applicationNumber", request.application_number().to_string()),
        ("maxDocuments", request.max_documents().to_string()),
        ("priorityOnly", request.priority_only().to_string()),
        ("includeDrawings", request.include_drawings().to_string()),
        ("skipCache", request.skip_cache().to_string()),
    ]
}

fn status_error(status: StatusCode, body: &str) -> AnalysisError {
    let message = if body.trim().is_empty() {
        format!("Analysis request failed with status {}", status.as_u16())
    } else {
        body.to_string()
    };
    warn!(status = %status, "Analysis request rejected");

    AnalysisError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Observer that keeps the terminal outcome
struct Collector {
    progress: Option<UnboundedSender<ProgressEvent>>,
    outcome: Option<Result<AnalysisResult, AnalysisError>>,
}

impl AnalysisObserver for Collector {
    fn on_progress(&mut self, event: ProgressEvent) {
        let Some(tx) = &self.progress else {
            return;
        };
        if tx.send(event).is_err() {
            trace!("Progress receiver dropped");
        }
    }

    fn on_complete(&mut self, result: AnalysisResult) {
        self.outcome = Some(Ok(result));
    }

    fn on_error(&mut self, error: AnalysisError) {
        self.outcome = Some(Err(error));
    }
}

//! Per-call session state

use std::ops::ControlFlow;

use domain::AnalysisRequest;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{AnalysisError, AnalysisEvent, AnalysisObserver, SseFrame, classify};

/// One outstanding analysis call
///
/// Tracks the cancellation token and the events seen so far, and enforces
/// that the observer hears at most one terminal event and nothing after
/// cancellation.
#[derive(Debug)]
pub struct StreamSession {
    request: AnalysisRequest,
    cancel: CancellationToken,
    events_seen: usize,
    finished: bool,
}

impl StreamSession {
    /// A session without a caller token gets a private one that never fires
    #[must_use]
    pub fn new(request: AnalysisRequest, cancel: Option<&CancellationToken>) -> Self {
        Self {
            request,
            cancel: cancel.cloned().unwrap_or_default(),
            events_seen: 0,
            finished: false,
        }
    }

    #[must_use]
    pub const fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Events delivered to the observer so far
    #[must_use]
    pub const fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// A terminal event has been delivered
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode, classify and deliver one frame
    ///
    /// Breaks when the session is over, either because a terminal event was
    /// delivered or because the caller cancelled.
    pub fn process<O>(&mut self, frame: &SseFrame, observer: &mut O) -> ControlFlow<()>
    where
        O: AnalysisObserver + ?Sized,
    {
        if self.finished || self.is_cancelled() {
            return ControlFlow::Break(());
        }

        let payload: serde_json::Value = match serde_json::from_str(&frame.data) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "Skipping unparseable data line");
                return ControlFlow::Continue(());
            },
        };

        match classify(frame.event_type.as_deref(), &payload) {
            Some(event) => self.dispatch(event, observer),
            None => {
                trace!(event_type = ?frame.event_type, "Ignoring unclassified payload");
                ControlFlow::Continue(())
            },
        }
    }

    fn dispatch<O>(&mut self, event: AnalysisEvent, observer: &mut O) -> ControlFlow<()>
    where
        O: AnalysisObserver + ?Sized,
    {
        self.events_seen += 1;
        match event {
            AnalysisEvent::Progress(progress) => {
                trace!(stage = %progress.stage, progress = progress.percent(), "Analysis progress");
                observer.on_progress(progress);
                ControlFlow::Continue(())
            },
            AnalysisEvent::Complete(result) => {
                debug!(
                    application_number = %self.request.application_number(),
                    documents = result.documents_analyzed,
                    "Analysis complete"
                );
                self.finished = true;
                observer.on_complete(result);
                ControlFlow::Break(())
            },
            AnalysisEvent::Failed(message) => {
                warn!(message = %message, "Analysis reported an error");
                self.fail(AnalysisError::Server { message }, observer);
                ControlFlow::Break(())
            },
        }
    }

    /// Deliver a terminal error unless the session is already over
    pub fn fail<O>(&mut self, error: AnalysisError, observer: &mut O)
    where
        O: AnalysisObserver + ?Sized,
    {
        if self.finished || self.is_cancelled() {
            return;
        }
        self.finished = true;
        observer.on_error(error);
    }
}

//! Receivers for analysis outcomes

use std::fmt;

use domain::{AnalysisResult, ProgressEvent};

use crate::AnalysisError;

/// Receives the events of one analysis session
///
/// Any number of `on_progress` calls are followed by at most one call to
/// `on_complete` or `on_error`. Nothing is called after cancellation.
pub trait AnalysisObserver {
    fn on_progress(&mut self, _event: ProgressEvent) {}

    fn on_complete(&mut self, result: AnalysisResult);

    fn on_error(&mut self, error: AnalysisError);
}

/// Closure-backed [`AnalysisObserver`]
///
/// ```ignore
/// let mut callbacks = Callbacks::new(
///     |result| println!("{} documents", result.documents_analyzed),
///     |error| eprintln!("{error}"),
/// )
/// .on_progress(|event| println!("{}%", event.percent()));
/// ```
pub struct Callbacks<P, C, E> {
    progress: Option<P>,
    complete: C,
    error: E,
}

impl<C, E> Callbacks<fn(ProgressEvent), C, E>
where
    C: FnMut(AnalysisResult),
    E: FnMut(AnalysisError),
{
    pub const fn new(complete: C, error: E) -> Self {
        Self {
            progress: None,
            complete,
            error,
        }
    }
}

impl<P, C, E> Callbacks<P, C, E> {
    #[must_use]
    pub fn on_progress<Q>(self, progress: Q) -> Callbacks<Q, C, E>
    where
        Q: FnMut(ProgressEvent),
    {
        Callbacks {
            progress: Some(progress),
            complete: self.complete,
            error: self.error,
        }
    }
}

impl<P, C, E> fmt::Debug for Callbacks<P, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl<P, C, E> AnalysisObserver for Callbacks<P, C, E>
where
    P: FnMut(ProgressEvent),
    C: FnMut(AnalysisResult),
    E: FnMut(AnalysisError),
{
    fn on_progress(&mut self, event: ProgressEvent) {
        if let Some(progress) = self.progress.as_mut() {
            progress(event);
        }
    }

    fn on_complete(&mut self, result: AnalysisResult) {
        (self.complete)(result);
    }

    fn on_error(&mut self, error: AnalysisError) {
        (self.error)(error);
    }
}

#[cfg(test)]
mod tests {
    use domain::AnalysisStage;

    use super::*;

    #[test]
    fn callbacks_forward_to_closures() {
        let mut stages = Vec::new();
        let mut completed = 0;
        let mut errors = Vec::new();

        {
            let mut callbacks = Callbacks::new(|_| completed += 1, |e: AnalysisError| {
                errors.push(e.to_string());
            })
            .on_progress(|event: ProgressEvent| stages.push(event.stage));

            AnalysisObserver::on_progress(
                &mut callbacks,
                ProgressEvent {
                    stage: AnalysisStage::Retrieving,
                    ..Default::default()
                },
            );
            callbacks.on_complete(AnalysisResult::default());
            callbacks.on_error(AnalysisError::StreamEnded);
        }

        assert_eq!(stages, vec![AnalysisStage::Retrieving]);
        assert_eq!(completed, 1);
        assert_eq!(errors, vec!["Analysis stream ended without a result".to_string()]);
    }

    #[test]
    fn progress_is_optional() {
        let mut completed = false;
        {
            let mut callbacks = Callbacks::new(|_| completed = true, |_| {});
            AnalysisObserver::on_progress(&mut callbacks, ProgressEvent::default());
            callbacks.on_complete(AnalysisResult::default());
        }
        assert!(completed);
    }

    #[test]
    fn debug_shows_progress_presence() {
        let callbacks = Callbacks::new(|_| {}, |_| {});
        assert!(format!("{callbacks:?}").contains("progress: false"));
    }
}

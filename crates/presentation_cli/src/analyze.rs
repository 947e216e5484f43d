//! `planwatch analyze`: live document analysis

use doc_intel::{AnalysisError, AnalysisObserver, DocIntelClient};
use domain::{AnalysisRequest, AnalysisResult, ProgressEvent};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::output;

/// How an analysis run ended
#[derive(Debug)]
pub enum Outcome {
    Completed(AnalysisResult),
    Failed(AnalysisError),
    Cancelled,
}

/// Prints progress to stderr and keeps the terminal event
#[derive(Debug, Default)]
struct ProgressPrinter {
    json: bool,
    outcome: Option<Outcome>,
}

impl AnalysisObserver for ProgressPrinter {
    fn on_progress(&mut self, event: ProgressEvent) {
        if self.json {
            if let Ok(line) = serde_json::to_string(&event) {
                eprintln!("{line}");
            }
        } else {
            eprintln!("{}", output::progress_line(&event));
        }
    }

    fn on_complete(&mut self, result: AnalysisResult) {
        self.outcome = Some(Outcome::Completed(result));
    }

    fn on_error(&mut self, error: AnalysisError) {
        self.outcome = Some(Outcome::Failed(error));
    }
}

/// Stream an analysis, printing progress as it arrives
///
/// Ctrl-C cancels the stream; no callback fires after that.
pub async fn run(
    client: &DocIntelClient,
    request: &AnalysisRequest,
    json: bool,
) -> Result<Outcome, AnalysisError> {
    let token = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_ctrl_c(token.clone()));

    let mut printer = ProgressPrinter {
        json,
        outcome: None,
    };
    let result = client
        .analyze_documents_streaming(request, &mut printer, Some(&token))
        .await;
    watcher.abort();
    result?;

    Ok(printer.outcome.unwrap_or(Outcome::Cancelled))
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        debug!("Ctrl-C received, cancelling analysis");
        token.cancel();
    }
}

//! Integration tests for the streaming analysis client using WireMock

use std::time::Duration;

use backend_api::{CredentialStore, SharedCredentials};
use doc_intel::{AnalysisConfig, AnalysisError, AnalysisObserver, Callbacks, DocIntelClient};
use domain::{AnalysisRequest, AnalysisResult, AnalysisStage, ProgressEvent};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Progress(AnalysisStage),
    Complete(AnalysisResult),
    Error(AnalysisError),
}

#[derive(Default)]
struct Recorder {
    seen: Vec<Seen>,
    cancel_on_progress: Option<CancellationToken>,
}

impl AnalysisObserver for Recorder {
    fn on_progress(&mut self, event: ProgressEvent) {
        self.seen.push(Seen::Progress(event.stage));
        if let Some(token) = &self.cancel_on_progress {
            token.cancel();
        }
    }

    fn on_complete(&mut self, result: AnalysisResult) {
        self.seen.push(Seen::Complete(result));
    }

    fn on_error(&mut self, error: AnalysisError) {
        self.seen.push(Seen::Error(error));
    }
}

impl Recorder {
    fn terminal_count(&self) -> usize {
        self.seen
            .iter()
            .filter(|s| matches!(s, Seen::Complete(_) | Seen::Error(_)))
            .count()
    }
}

fn client_for(server: &MockServer, credentials: SharedCredentials) -> DocIntelClient {
    DocIntelClient::new(AnalysisConfig::with_base_url(server.uri()), credentials)
        .expect("Failed to create client")
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new("FW24A/0123").unwrap()
}

fn sse(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

async fn mount_stream(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/analyze"))
        .respond_with(sse(body))
        .mount(server)
        .await;
}

const COMPLETE_BODY: &str = "event: progress\n\
data: {\"stage\":\"connecting\",\"message\":\"Connecting\",\"progress\":0}\n\n\
event: progress\n\
data: {\"stage\":\"downloading\",\"message\":\"Downloading\",\"progress\":30,\"documentsTotal\":3}\n\n\
event: complete\n\
data: {\"documentsFound\":3,\"documentsAnalyzed\":3,\"analyses\":[{\"documentName\":\"Site plan.pdf\",\"images\":[{\"page\":1}]}],\"summary\":\"Single storey rear extension\",\"keyFindings\":[\"Height 4.2m\"],\"processingTimeMs\":5120,\"cached\":false}\n\n";

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn sends_query_accept_and_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analyze"))
        .and(query_param("applicationNumber", "FW24A/0123"))
        .and(query_param("maxDocuments", "50"))
        .and(query_param("priorityOnly", "false"))
        .and(query_param("includeDrawings", "true"))
        .and(query_param("skipCache", "false"))
        .and(header("accept", "text/event-stream"))
        .and(header("authorization", "Bearer stream-token"))
        .and(header("x-user-id", "user-42"))
        .respond_with(sse(COMPLETE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = CredentialStore::shared();
    credentials.set_token("stream-token");
    credentials.set_user_id("user-42");

    let client = client_for(&server, credentials);
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.terminal_count(), 1);
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn progress_then_complete() {
    let server = MockServer::start().await;
    mount_stream(&server, COMPLETE_BODY).await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.seen.len(), 3);
    assert_eq!(recorder.seen[0], Seen::Progress(AnalysisStage::Connecting));
    assert_eq!(recorder.seen[1], Seen::Progress(AnalysisStage::Downloading));
    match &recorder.seen[2] {
        Seen::Complete(result) => {
            assert_eq!(result.documents_analyzed, 3);
            assert_eq!(result.summary.as_deref(), Some("Single storey rear extension"));
            assert_eq!(result.image_count(), 1);
            assert!((result.processing_time_ms - 5120.0).abs() < f64::EPSILON);
        },
        other => panic!("expected complete, got {other:?}"),
    }
}

#[tokio::test]
async fn first_terminal_error_wins() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: {\"stage\":\"retrieving\",\"progress\":10}\n\
         event: error\n\
         data: {\"message\":\"Planning portal unavailable\"}\n\
         event: complete\n\
         data: {\"analyses\":[]}\n\
         data: {\"progress\":99}\n",
    )
    .await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(
        recorder.seen,
        vec![
            Seen::Progress(AnalysisStage::Retrieving),
            Seen::Error(AnalysisError::Server {
                message: "Planning portal unavailable".to_string()
            }),
        ]
    );
}

#[tokio::test]
async fn http_error_returns_body_without_callbacks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    let err = client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "internal failure");
    assert_eq!(err.status(), Some(500));
    assert!(recorder.seen.is_empty());
}

#[tokio::test]
async fn http_error_with_empty_body_names_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    let err = client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Analysis request failed with status 503");
}

#[tokio::test]
async fn unauthorized_stream_leaves_credentials_alone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let credentials = CredentialStore::shared();
    credentials.set_token("tok");
    let client = client_for(&server, credentials.clone());
    let mut recorder = Recorder::default();
    let err = client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(credentials.is_authenticated());
}

#[tokio::test]
async fn malformed_data_line_is_skipped() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: {bad\n\
         data: {\"stage\":\"analyzing\",\"progress\":42,\"documentsTotal\":10,\"documentsComplete\":4}\n\
         event: complete\n\
         data: {\"analyses\":[]}\n",
    )
    .await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.seen.len(), 2);
    assert_eq!(recorder.seen[0], Seen::Progress(AnalysisStage::Analyzing));
    assert!(matches!(recorder.seen[1], Seen::Complete(_)));
}

#[tokio::test]
async fn field_based_progress_without_event_line() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "data: {\"stage\":\"analyzing\",\"progress\":42,\"documentsTotal\":10,\"documentsComplete\":4}\n",
    )
    .await;

    let client = client_for(&server, CredentialStore::shared());
    let mut progress = Vec::new();
    let mut errors = Vec::new();
    {
        let mut callbacks = Callbacks::new(|_| {}, |e| errors.push(e))
            .on_progress(|event: ProgressEvent| progress.push(event));
        client
            .analyze_documents_streaming(&request(), &mut callbacks, None)
            .await
            .unwrap();
    }

    assert_eq!(progress.len(), 1);
    assert!((progress[0].percent() - 42.0).abs() < f64::EPSILON);
    assert_eq!(progress[0].documents_complete, 4);
    assert_eq!(errors, vec![AnalysisError::StreamEnded]);
}

#[tokio::test]
async fn unterminated_final_line_is_processed() {
    let server = MockServer::start().await;
    mount_stream(&server, "event: complete\ndata: {\"analyses\":[]}").await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.seen.len(), 1);
    assert!(matches!(recorder.seen[0], Seen::Complete(_)));
}

#[tokio::test]
async fn loosely_typed_payloads_are_delivered() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "event: progress\n\
         data: {\"stage\":\"analyzing\",\"progress\":10,\"documentsTotal\":null}\n\
         event: complete\n\
         data: {\"analyses\":[{\"documentName\":\"a.pdf\",\"keyFacts\":[\"9.5m high\"]}],\"processingTime\":5.12}\n",
    )
    .await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.seen.len(), 2);
    assert_eq!(recorder.seen[0], Seen::Progress(AnalysisStage::Analyzing));
    match &recorder.seen[1] {
        Seen::Complete(result) => {
            assert!((result.processing_time_ms - 5.12).abs() < f64::EPSILON);
            assert_eq!(result.analyses[0].document_name, "a.pdf");
            assert_eq!(result.analyses[0].key_facts.len(), 1);
        },
        other => panic!("expected complete, got {other:?}"),
    }
}

#[tokio::test]
async fn overlong_line_fails_the_session() {
    let server = MockServer::start().await;
    let body = format!(
        "data: {{\"progress\":5}}\ndata: {{\"analyses\":[],\"summary\":\"{}\"}}\n",
        "x".repeat(4096)
    );
    mount_stream(&server, &body).await;

    let config = AnalysisConfig {
        max_line_bytes: 1024,
        ..AnalysisConfig::with_base_url(server.uri())
    };
    let client = DocIntelClient::new(config, CredentialStore::shared()).unwrap();
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.seen.len(), 2);
    assert_eq!(recorder.seen[0], Seen::Progress(AnalysisStage::Unknown));
    assert!(matches!(&recorder.seen[1], Seen::Error(AnalysisError::Stream(msg)) if msg.contains("1024")));
}

#[tokio::test]
async fn silent_end_reports_stream_ended() {
    let server = MockServer::start().await;
    mount_stream(&server, ": keep-alive\n\n").await;

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, None)
        .await
        .unwrap();

    assert_eq!(recorder.seen, vec![Seen::Error(AnalysisError::StreamEnded)]);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn cancellation_mid_stream_stops_callbacks() {
    let server = MockServer::start().await;
    mount_stream(&server, COMPLETE_BODY).await;

    let token = CancellationToken::new();
    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder {
        cancel_on_progress: Some(token.clone()),
        ..Default::default()
    };

    client
        .analyze_documents_streaming(&request(), &mut recorder, Some(&token))
        .await
        .unwrap();

    assert_eq!(recorder.seen, vec![Seen::Progress(AnalysisStage::Connecting)]);
}

#[tokio::test]
async fn cancellation_before_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analyze"))
        .respond_with(sse(COMPLETE_BODY).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let client = client_for(&server, CredentialStore::shared());
    let mut recorder = Recorder::default();
    client
        .analyze_documents_streaming(&request(), &mut recorder, Some(&token))
        .await
        .unwrap();

    assert!(recorder.seen.is_empty());
}

#[tokio::test]
async fn cancellation_while_reading_error_body() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Headers arrive at once; the error body never finishes.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0_u8; 4096];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 1000\r\n\r\npartial",
            )
            .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let client = DocIntelClient::new(
        AnalysisConfig::with_base_url(format!("http://{addr}")),
        CredentialStore::shared(),
    )
    .unwrap();
    let mut recorder = Recorder::default();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.analyze_documents_streaming(&request(), &mut recorder, Some(&token)),
    )
    .await
    .expect("cancellation should end the call");

    assert!(result.is_ok());
    assert!(recorder.seen.is_empty());
}

// =============================================================================
// Awaiting the result
// =============================================================================

#[tokio::test]
async fn analyze_documents_returns_result_and_forwards_progress() {
    let server = MockServer::start().await;
    mount_stream(&server, COMPLETE_BODY).await;

    let client = client_for(&server, CredentialStore::shared());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let result = client
        .analyze_documents(&request(), Some(tx), None)
        .await
        .unwrap();
    assert_eq!(result.key_findings, vec!["Height 4.2m".to_string()]);

    let mut stages = Vec::new();
    while let Ok(event) = rx.try_recv() {
        stages.push(event.stage);
    }
    assert_eq!(stages, vec![AnalysisStage::Connecting, AnalysisStage::Downloading]);
}

#[tokio::test]
async fn analyze_documents_surfaces_server_error() {
    let server = MockServer::start().await;
    mount_stream(&server, "data: {\"stage\":\"error\",\"error\":\"No documents found\"}\n").await;

    let client = client_for(&server, CredentialStore::shared());
    let err = client.analyze_documents(&request(), None, None).await.unwrap_err();
    assert_eq!(
        err,
        AnalysisError::Server {
            message: "No documents found".to_string()
        }
    );
}

#[tokio::test]
async fn analyze_documents_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analyze"))
        .respond_with(sse(COMPLETE_BODY).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = AnalysisConfig {
        completion_timeout_secs: Some(1),
        ..AnalysisConfig::with_base_url(server.uri())
    };
    let client = DocIntelClient::new(config, CredentialStore::shared()).unwrap();

    let err = client.analyze_documents(&request(), None, None).await.unwrap_err();
    assert_eq!(err, AnalysisError::Timeout);
}

#[tokio::test]
async fn analyze_documents_reports_cancellation() {
    let server = MockServer::start().await;
    mount_stream(&server, COMPLETE_BODY).await;

    let token = CancellationToken::new();
    token.cancel();

    let client = client_for(&server, CredentialStore::shared());
    let err = client
        .analyze_documents(&request(), None, Some(&token))
        .await
        .unwrap_err();
    assert_eq!(err, AnalysisError::Cancelled);
}

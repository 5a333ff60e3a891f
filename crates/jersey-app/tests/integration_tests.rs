// Integration tests for the app orchestrator and the form client.
//
// The orchestrator tests drive `app::run` through its channels with a
// scripted submitter. The form client tests talk to a loopback listener
// that plays the part of the form endpoint.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use jersey_app::app::{
    self, AppState, CLEAR_FAILED_MESSAGE, SAVE_FAILED_MESSAGE, SUBMIT_FAILED_PREFIX,
};
use jersey_app::protocol::*;
use jersey_app::submit::{FormClient, SubmissionClient, SubmitError, Submitter};
use jersey_core::config::{FieldNames, SubmissionConfig};
use jersey_core::selection::SubmissionPayload;
use jersey_core::votes::{KeyValueStore, MemoryStore, VoteStore};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Submitter that records payloads and answers from a script.
struct ScriptedSubmitter {
    outcomes: Mutex<Vec<Result<(), SubmitError>>>,
    seen: Mutex<Vec<SubmissionPayload>>,
}

impl ScriptedSubmitter {
    fn new(outcomes: Vec<Result<(), SubmitError>>) -> Arc<Self> {
        Arc::new(ScriptedSubmitter {
            outcomes: Mutex::new(outcomes),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<SubmissionPayload> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        self.seen.lock().unwrap().push(payload.clone());
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            Ok(())
        } else {
            outcomes.remove(0)
        }
    }
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(store: Box<dyn KeyValueStore>, submitter: Arc<dyn Submitter>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(16);
        let (submission_tx, submission_rx) = mpsc::channel(4);
        let votes = VoteStore::load(store, "jerseyVotes");
        let state = AppState::new(votes, submitter, submission_tx);
        let handle = tokio::spawn(app::run(cmd_rx, submission_rx, ui_tx, state));
        Harness {
            cmd_tx,
            ui_rx,
            handle,
        }
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.unwrap();
    }

    async fn next(&mut self) -> UiUpdate {
        tokio::time::timeout(Duration::from_secs(5), self.ui_rx.recv())
            .await
            .expect("timed out waiting for a UI update")
            .expect("UI channel closed")
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

fn payload(opinion: &str) -> SubmissionPayload {
    SubmissionPayload {
        jersey_name: "Design 1".into(),
        player_name: String::new(),
        opinion: opinion.into(),
    }
}

/// Accept one HTTP request on a loopback port, reply with `status` after
/// `delay`, and hand back the raw request text.
async fn serve_once(
    status: &'static str,
    delay: Duration,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }
        tokio::time::sleep(delay).await;
        let response = format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let _ = socket.write_all(response.as_bytes()).await;
        String::from_utf8_lossy(&buf).into_owned()
    });
    (format!("http://{addr}/formResponse"), handle)
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    buf.len() >= header_end + 4 + content_length
}

fn google_fields() -> FieldNames {
    FieldNames {
        jersey_name: "entry.23019623".into(),
        player_name: "entry.1586441492".into(),
        opinion: "entry.1513059736".into(),
    }
}

// ===========================================================================
// Orchestrator
// ===========================================================================

#[tokio::test]
async fn startup_sends_loaded_votes() {
    let store = MemoryStore::new().with_entry("jerseyVotes", r#"["d2","d4"]"#);
    let mut h = Harness::start(Box::new(store), ScriptedSubmitter::new(vec![]));
    assert_eq!(
        h.next().await,
        UiUpdate::VotesChanged(vec!["d2".into(), "d4".into()])
    );
    h.quit().await;
}

#[tokio::test]
async fn corrupt_stored_votes_start_empty() {
    let store = MemoryStore::new().with_entry("jerseyVotes", "{not json");
    let mut h = Harness::start(Box::new(store), ScriptedSubmitter::new(vec![]));
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec![]));
    h.quit().await;
}

#[tokio::test]
async fn toggle_twice_restores_vote_set() {
    let mut h = Harness::start(Box::new(MemoryStore::new()), ScriptedSubmitter::new(vec![]));
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec![]));

    h.send(UserCommand::ToggleVote("d1".into())).await;
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec!["d1".into()]));
    h.send(UserCommand::ToggleVote("d1".into())).await;
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec![]));
    h.quit().await;
}

#[tokio::test]
async fn save_reports_vote_count() {
    let mut h = Harness::start(Box::new(MemoryStore::new()), ScriptedSubmitter::new(vec![]));
    h.next().await;
    h.send(UserCommand::ToggleVote("d1".into())).await;
    h.next().await;
    h.send(UserCommand::ToggleVote("d3".into())).await;
    h.next().await;

    h.send(UserCommand::SaveVotes).await;
    assert_eq!(
        h.next().await,
        UiUpdate::Notice(Notice::info(
            "Thanks — your 2 vote(s) have been recorded locally."
        ))
    );
    h.quit().await;
}

#[tokio::test]
async fn save_failure_keeps_votes_in_memory() {
    let store = MemoryStore::new().read_only();
    let mut h = Harness::start(Box::new(store), ScriptedSubmitter::new(vec![]));
    h.next().await;
    h.send(UserCommand::ToggleVote("d5".into())).await;
    h.next().await;

    h.send(UserCommand::SaveVotes).await;
    assert_eq!(
        h.next().await,
        UiUpdate::Notice(Notice::error(SAVE_FAILED_MESSAGE))
    );

    // Still usable for the session.
    h.send(UserCommand::ToggleVote("d1".into())).await;
    assert_eq!(
        h.next().await,
        UiUpdate::VotesChanged(vec!["d5".into(), "d1".into()])
    );
    h.quit().await;
}

#[tokio::test]
async fn clear_votes_empties_set() {
    let store = MemoryStore::new().with_entry("jerseyVotes", r#"["d1"]"#);
    let mut h = Harness::start(Box::new(store), ScriptedSubmitter::new(vec![]));
    h.next().await;
    h.send(UserCommand::ClearVotes).await;
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec![]));
    h.quit().await;
}

#[tokio::test]
async fn clear_failure_is_reported() {
    let store = MemoryStore::new()
        .with_entry("jerseyVotes", r#"["d1"]"#)
        .read_only();
    let mut h = Harness::start(Box::new(store), ScriptedSubmitter::new(vec![]));
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec!["d1".into()]));

    h.send(UserCommand::ClearVotes).await;
    assert_eq!(h.next().await, UiUpdate::VotesChanged(vec![]));
    assert_eq!(
        h.next().await,
        UiUpdate::Notice(Notice::error(CLEAR_FAILED_MESSAGE))
    );
    h.quit().await;
}

#[tokio::test]
async fn successful_submission_reaches_ui() {
    let submitter = ScriptedSubmitter::new(vec![Ok(())]);
    let mut h = Harness::start(Box::new(MemoryStore::new()), submitter.clone());
    h.next().await;

    h.send(UserCommand::Submit(payload("Great design"))).await;
    assert!(matches!(h.next().await, UiUpdate::SubmissionSucceeded { .. }));
    assert_eq!(submitter.seen(), vec![payload("Great design")]);
    h.quit().await;
}

#[tokio::test]
async fn failed_submission_reports_error_and_allows_retry() {
    let submitter = ScriptedSubmitter::new(vec![Err(SubmitError::Timeout), Ok(())]);
    let mut h = Harness::start(Box::new(MemoryStore::new()), submitter.clone());
    h.next().await;

    h.send(UserCommand::Submit(payload("Great design"))).await;
    match h.next().await {
        UiUpdate::SubmissionFailed { message } => {
            assert!(message.starts_with(SUBMIT_FAILED_PREFIX));
            assert!(message.contains("timed out"));
        }
        other => panic!("expected SubmissionFailed, got {other:?}"),
    }

    h.send(UserCommand::Submit(payload("Great design"))).await;
    assert!(matches!(h.next().await, UiUpdate::SubmissionSucceeded { .. }));
    assert_eq!(submitter.seen().len(), 2);
    h.quit().await;
}

#[tokio::test]
async fn disabled_client_surfaces_not_configured() {
    let mut h = Harness::start(
        Box::new(MemoryStore::new()),
        Arc::new(SubmissionClient::Disabled),
    );
    h.next().await;
    h.send(UserCommand::Submit(payload(""))).await;
    match h.next().await {
        UiUpdate::SubmissionFailed { message } => {
            assert!(message.contains("not configured"));
        }
        other => panic!("expected SubmissionFailed, got {other:?}"),
    }
    h.quit().await;
}

#[tokio::test]
async fn closing_command_channel_stops_loop() {
    let Harness {
        cmd_tx,
        mut ui_rx,
        handle,
    } = Harness::start(Box::new(MemoryStore::new()), ScriptedSubmitter::new(vec![]));
    ui_rx.recv().await;
    drop(cmd_tx);
    handle.await.unwrap().unwrap();
}

// ===========================================================================
// Form client against a loopback endpoint
// ===========================================================================

#[tokio::test]
async fn form_client_posts_form_encoded_fields() {
    let (url, server) = serve_once("200 OK", Duration::ZERO).await;
    let client = FormClient::new(url, google_fields(), Duration::from_secs(5)).unwrap();

    client.submit(&payload("Great design")).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /formResponse"));
    assert!(request
        .to_ascii_lowercase()
        .contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.ends_with(
        "entry.23019623=Design+1&entry.1586441492=&entry.1513059736=Great+design"
    ));
}

#[tokio::test]
async fn form_client_treats_non_2xx_as_failure() {
    let (url, server) = serve_once("500 Internal Server Error", Duration::ZERO).await;
    let client = FormClient::new(url, FieldNames::default(), Duration::from_secs(5)).unwrap();

    let err = client.submit(&payload("x")).await.unwrap_err();
    match err {
        SubmitError::Status(status) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected Status error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn form_client_times_out() {
    let (url, server) = serve_once("200 OK", Duration::from_secs(3)).await;
    let client =
        FormClient::new(url, FieldNames::default(), Duration::from_millis(200)).unwrap();

    let err = client.submit(&payload("x")).await.unwrap_err();
    assert!(matches!(err, SubmitError::Timeout), "got {err:?}");
    server.abort();
}

#[tokio::test]
async fn form_client_reports_connection_refused() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = SubmissionConfig {
        endpoint: Some(format!("http://{addr}/formResponse")),
        ..SubmissionConfig::default()
    };
    let client = SubmissionClient::from_config(&config).unwrap();
    let err = client.submit(&payload("x")).await.unwrap_err();
    assert!(matches!(err, SubmitError::Network(_)), "got {err:?}");
}

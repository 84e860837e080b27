//! Stream Consumer Integration Tests
//!
//! Drives the full open-and-consume path over a loopback HTTP server: a
//! scripted NDJSON body, a non-2xx stream open, and the no-session guard.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use leaselens::core::{FailureKind, StreamStatus};
use leaselens::{AnalysisSession, ApiClient, RunOutcome, StreamConfig, StreamConsumer};

use crate::support::spawn_server;

fn fast_config() -> StreamConfig {
    StreamConfig {
        reveal_interval: Duration::from_millis(1),
        exit_duration: Duration::from_millis(2),
        max_visible: 6,
        idle_timeout: Duration::from_secs(5),
        done_delay: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn test_open_and_consume_to_done() {
    let body = concat!(
        "{\"type\": \"progress\", \"message\": \"Researching market\", \"topic\": \"Vacancy Rate\"}\n",
        "{\"type\": \"cards\", \"cards\": [{\"title\": \"Vacancy Rate\", \"impact\": \"positive\", \"data_evidence\": \"8.1%\"}]}\n",
        "{\"type\": \"dashboard\", \"data\": {\"fair_market_rent\": 42.5, \"confidence_score\": 80}}\n",
        "{\"type\": \"done\"}\n",
    );
    let (base, handle) = spawn_server(vec![(200, body.to_string())]);
    let api = ApiClient::new(&base).unwrap();

    let mut consumer = StreamConsumer::new(AnalysisSession::new("sess-1"), fast_config());
    let cancel = CancellationToken::new();
    let outcome = consumer.open(&api, &cancel).await.unwrap();
    assert_eq!(outcome, RunOutcome::Finished);

    let session = consumer.session();
    assert_eq!(session.status, StreamStatus::Done);
    assert_eq!(session.cards.len(), 1);
    assert_eq!(session.dashboard.as_ref().unwrap().fair_market_rent, 42.5);

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].url, "/api/analyze/stream?session_id=sess-1");
}

#[tokio::test]
async fn test_non_2xx_stream_open_is_transport_failure() {
    let (base, handle) = spawn_server(vec![(
        503,
        r#"{"detail": "Analysis backend overloaded"}"#.to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let mut consumer = StreamConsumer::new(AnalysisSession::new("sess-2"), fast_config());
    let cancel = CancellationToken::new();
    let outcome = consumer.open(&api, &cancel).await.unwrap();
    assert_eq!(outcome, RunOutcome::Finished);

    let session = consumer.session();
    assert_eq!(session.status, StreamStatus::Error);
    let failure = session.failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(failure.message.contains("Analysis backend overloaded"));
    handle.join().unwrap();
}

#[tokio::test]
async fn test_blank_session_id_never_touches_network() {
    // Port 1 would refuse the connection; the guard must fire first
    let api = ApiClient::new("http://127.0.0.1:1").unwrap();

    let mut consumer = StreamConsumer::new(AnalysisSession::new("  "), fast_config());
    let cancel = CancellationToken::new();
    let outcome = consumer.open(&api, &cancel).await.unwrap();
    assert_eq!(outcome, RunOutcome::Finished);

    let session = consumer.session();
    assert_eq!(session.status, StreamStatus::Error);
    assert_eq!(
        session.failure.as_ref().unwrap().kind,
        FailureKind::MissingSession
    );
}

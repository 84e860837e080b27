//! Card Edit Flow Integration Tests
//!
//! The propose/review/confirm path over a loopback server: the edit stream
//! resolving to a review, confirmation replacing exactly one card, and a
//! server rejection leaving the session untouched.

use tokio_util::sync::CancellationToken;

use leaselens::core::{CardSource, StreamStatus};
use leaselens::{
    AnalysisSession, ApiClient, CardEditor, EditPhase, SessionSnapshot, StreamConfig,
};

use crate::support::spawn_server;

fn completed_session() -> AnalysisSession {
    let snapshot: SessionSnapshot = serde_json::from_str(
        r#"{
            "dashboard_summary": {"fair_market_rent": 31.5},
            "cards": [{"title": "Vacancy Rate", "impact": "positive", "data_evidence": "8.1%"}]
        }"#,
    )
    .unwrap();
    AnalysisSession::from_snapshot("sess-1", snapshot)
}

const EDIT_STREAM: &str = concat!(
    "{\"type\": \"progress\", \"message\": \"Re-checking vacancy data\"}\n",
    "{\"type\": \"done\", \"index\": 0, \"source\": \"validation\", ",
    "\"original\": {\"title\": \"Vacancy Rate\", \"impact\": \"positive\", \"data_evidence\": \"8.1%\"}, ",
    "\"updated\": {\"title\": \"Vacancy Rate\", \"impact\": \"positive\", \"data_evidence\": \"7.4% per 2026 survey\"}}\n",
);

#[tokio::test]
async fn test_full_edit_flow_replaces_one_card() {
    let confirm = r#"{"ok": true, "updated_card": {"title": "Vacancy Rate", "impact": "positive", "data_evidence": "7.4% (confirmed)"}}"#;
    let (base, handle) = spawn_server(vec![
        (200, EDIT_STREAM.to_string()),
        (200, confirm.to_string()),
    ]);
    let api = ApiClient::new(&base).unwrap();

    let mut session = completed_session();
    assert_eq!(session.status, StreamStatus::Done);

    let mut editor = CardEditor::new(StreamConfig::default());
    let cancel = CancellationToken::new();
    let phase = editor
        .propose(
            &api,
            "sess-1",
            0,
            "Use the 2026 survey numbers",
            CardSource::Validation,
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(phase, EditPhase::Review);
    assert_eq!(
        editor.review().unwrap().updated.data_evidence.as_deref(),
        Some("7.4% per 2026 survey")
    );

    let phase = editor.confirm(&api, &mut session).await.unwrap();
    assert_eq!(phase, EditPhase::Applied);
    assert_eq!(session.cards.len(), 1, "replacement, not append");
    assert_eq!(
        session.cards[0].data_evidence.as_deref(),
        Some("7.4% (confirmed)"),
        "the service's canonical copy wins"
    );

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/api/custom-cards/0/edit/stream");
    assert!(recorded[0].body.contains("\"prompt\":\"Use the 2026 survey numbers\""));
    assert!(recorded[0].body.contains("\"source\":\"validation\""));
    assert_eq!(recorded[1].url, "/api/custom-cards/0/confirm");
    assert!(recorded[1].body.contains("\"session_id\":\"sess-1\""));
}

#[tokio::test]
async fn test_confirm_rejection_leaves_session_untouched() {
    let (base, handle) = spawn_server(vec![
        (200, EDIT_STREAM.to_string()),
        (500, r#"{"detail": "Session expired"}"#.to_string()),
    ]);
    let api = ApiClient::new(&base).unwrap();

    let mut session = completed_session();
    let mut editor = CardEditor::new(StreamConfig::default());
    let cancel = CancellationToken::new();
    editor
        .propose(
            &api,
            "sess-1",
            0,
            "Use the 2026 survey numbers",
            CardSource::Validation,
            &cancel,
        )
        .await
        .unwrap();

    let phase = editor.confirm(&api, &mut session).await.unwrap();
    assert_eq!(phase, EditPhase::Failed);
    assert!(editor.failure().unwrap().contains("Session expired"));
    assert_eq!(
        session.cards[0].data_evidence.as_deref(),
        Some("8.1%"),
        "no local change without server confirmation"
    );

    editor.reset().unwrap();
    assert_eq!(editor.phase(), EditPhase::Idle);
    handle.join().unwrap();
}

#[tokio::test]
async fn test_streaming_custom_card_creation() {
    let creation = concat!(
        "{\"type\": \"progress\", \"message\": \"Generating card\"}\n",
        "{\"type\": \"done\", \"card\": {\"title\": \"Transit Access\", \"data_evidence\": \"2 blocks to light rail\"}, \"index\": 0}\n",
    );
    let (base, handle) = spawn_server(vec![(200, creation.to_string())]);
    let api = ApiClient::new(&base).unwrap();

    let mut session = completed_session();
    let cancel = CancellationToken::new();
    let outcome = leaselens::create_custom(
        &api,
        &mut session,
        "How is transit access?",
        &StreamConfig::default(),
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome, leaselens::CreateOutcome::Created { index: 0 });
    assert_eq!(session.custom_cards.len(), 1);
    assert_eq!(session.custom_cards[0].title, "Transit Access");

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].url, "/api/custom-cards/stream");
    assert!(recorded[0].body.contains("\"session_id\":\"sess-1\""));
}

//! Session Restore Integration Tests
//!
//! Launch-time restore against a scripted server: a full snapshot, a
//! summary-less snapshot, and a stale session pointer cleared on 404.

use leaselens::core::StreamStatus;
use leaselens::{
    ApiClient, ClientPrefs, LlmProvider, MemoryPrefsStore, PrefsStore, RestoreOutcome,
    SessionService,
};

use crate::support::spawn_server;

fn service(base: &str) -> SessionService<MemoryPrefsStore> {
    let api = ApiClient::new(base).unwrap();
    SessionService::with_store(api, MemoryPrefsStore::new())
}

#[tokio::test]
async fn test_restore_rebuilds_completed_session() {
    let dashboard = r#"{
        "property": {"name": "Gateway Plaza", "address": "100 Main St", "leasable_area": "12000", "current_base_rent": "28.50"},
        "dashboard_summary": {"fair_market_rent": 31.5, "confidence_score": 82},
        "cards": [
            {"title": "Vacancy Rate", "impact": "positive", "data_evidence": "8.1%"},
            {"title": "vacancy rate", "impact": "neutral", "data_evidence": "stale duplicate"}
        ]
    }"#;
    let custom = r#"{"cards": [{"title": "Zoning Risk", "impact": "negative", "data_evidence": "M-1 overlay"}]}"#;
    let (base, handle) = spawn_server(vec![
        (200, dashboard.to_string()),
        (200, custom.to_string()),
    ]);

    let outcome = service(&base).restore("sess-42").await.unwrap();
    let session = match outcome {
        RestoreOutcome::Restored(session) => session,
        other => panic!("expected Restored, got {other:?}"),
    };

    assert_eq!(session.session_id, "sess-42");
    assert_eq!(session.status, StreamStatus::Done);
    assert_eq!(session.cards.len(), 1, "snapshot cards are deduplicated");
    assert_eq!(session.custom_cards.len(), 1);
    assert_eq!(session.property.as_ref().unwrap().name, "Gateway Plaza");
    assert_eq!(session.dashboard.as_ref().unwrap().fair_market_rent, 31.5);

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].url, "/api/analyze/dashboard?session_id=sess-42");
    assert_eq!(recorded[1].url, "/api/custom-cards?session_id=sess-42");
}

#[tokio::test]
async fn test_restore_without_summary_is_idle() {
    let (base, handle) = spawn_server(vec![
        (200, r#"{"cards": []}"#.to_string()),
        (200, r#"{"cards": []}"#.to_string()),
    ]);

    let outcome = service(&base).restore("sess-7").await.unwrap();
    let session = match outcome {
        RestoreOutcome::Restored(session) => session,
        other => panic!("expected Restored, got {other:?}"),
    };

    assert_eq!(session.status, StreamStatus::Idle, "nothing streamed yet");
    assert!(session.dashboard.is_none());
    handle.join().unwrap();
}

#[tokio::test]
async fn test_restore_latest_clears_stale_pointer() {
    let (base, handle) = spawn_server(vec![(
        404,
        r#"{"detail": "Session not found"}"#.to_string(),
    )]);
    let seeded = MemoryPrefsStore::new();
    seeded
        .save(&ClientPrefs {
            last_session_id: Some("sess-old".to_string()),
            llm_provider: LlmProvider::OpenAi,
        })
        .unwrap();
    let api = ApiClient::new(&base).unwrap();
    let service = SessionService::with_store(api, seeded);

    let outcome = service.restore_latest().await.unwrap();
    assert_eq!(
        outcome,
        Some(RestoreOutcome::NotFound {
            session_id: "sess-old".to_string()
        })
    );
    assert!(
        service.prefs().unwrap().last_session_id.is_none(),
        "stale pointer cleared so the next launch skips it"
    );
    handle.join().unwrap();
}

#[tokio::test]
async fn test_restore_latest_without_pointer_is_none() {
    // No server: nothing stored means no request
    let service = service("http://127.0.0.1:1");
    assert!(service.restore_latest().await.unwrap().is_none());
}

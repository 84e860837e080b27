//! API Client Integration Tests
//!
//! Round trips against a scripted loopback server: request shapes on the
//! wire, response parsing, and the error mapping for non-2xx bodies.

use leaselens::core::Impact;
use leaselens::{AnalyzeRequest, ApiClient, AppError, LlmProvider, Role};

use crate::support::spawn_server;

// ============================================================================
// Analysis start
// ============================================================================

#[tokio::test]
async fn test_start_analysis_posts_form_and_returns_session_id() {
    let (base, handle) = spawn_server(vec![(
        200,
        r#"{"ok": true, "session_id": "sess-123"}"#.to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let request = AnalyzeRequest::new("Gateway Plaza", "100 Main St", "12000", "28.50")
        .analyzing_as(Role::Landlord)
        .with_provider(LlmProvider::Anthropic);
    let session_id = api.start_analysis(&request).await.unwrap();
    assert_eq!(session_id, "sess-123");

    let recorded = handle.join().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/api/analyze/start");
    assert!(recorded[0].body.contains("property_name=Gateway+Plaza"));
    assert!(recorded[0].body.contains("analyze_as=landlord"));
    assert!(recorded[0].body.contains("llm_provider=anthropic"));
}

#[tokio::test]
async fn test_start_analysis_rejects_blank_property_locally() {
    // No server: validation fails before any request is sent
    let api = ApiClient::new("http://127.0.0.1:1").unwrap();
    let request = AnalyzeRequest::new("  ", "100 Main St", "12000", "28.50");

    let err = api.start_analysis(&request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

// ============================================================================
// Dashboard fetch and error mapping
// ============================================================================

#[tokio::test]
async fn test_fetch_dashboard_parses_snapshot() {
    let (base, handle) = spawn_server(vec![(
        200,
        r#"{
            "property": {"name": "Gateway Plaza", "address": "100 Main St", "leasable_area": "12000", "current_base_rent": "28.50"},
            "dashboard_summary": {"fair_market_rent": 31.5, "confidence_score": 82},
            "cards": [{"title": "Vacancy Rate", "impact": "positive", "data_evidence": "8.1%"}]
        }"#
        .to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let snapshot = api.fetch_dashboard("sess-9").await.unwrap();
    assert_eq!(snapshot.property.unwrap().name, "Gateway Plaza");
    assert_eq!(snapshot.dashboard_summary.unwrap().fair_market_rent, 31.5);
    assert_eq!(snapshot.cards.len(), 1);
    assert_eq!(snapshot.cards[0].impact, Impact::Positive);

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].url, "/api/analyze/dashboard?session_id=sess-9");
}

#[tokio::test]
async fn test_fetch_dashboard_404_is_session_not_found() {
    let (base, handle) = spawn_server(vec![(
        404,
        r#"{"detail": "Session not found"}"#.to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let err = api.fetch_dashboard("gone").await.unwrap_err();
    match err {
        AppError::SessionNotFound { session_id } => assert_eq!(session_id, "gone"),
        other => panic!("expected SessionNotFound, got {other:?}"),
    }
    handle.join().unwrap();
}

#[tokio::test]
async fn test_structured_error_detail_is_flattened() {
    let (base, handle) = spawn_server(vec![(
        422,
        r#"{"detail": [{"loc": ["body", "prompt"], "msg": "field required"}]}"#.to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let err = api.fetch_dashboard("sess-1").await.unwrap_err();
    match err {
        AppError::Api { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("field required"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    handle.join().unwrap();
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept_verbatim() {
    let (base, handle) = spawn_server(vec![(500, "Internal Server Error".to_string())]);
    let api = ApiClient::new(&base).unwrap();

    let err = api.fetch_dashboard("sess-1").await.unwrap_err();
    match err {
        AppError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    handle.join().unwrap();
}

// ============================================================================
// Chat and health
// ============================================================================

#[tokio::test]
async fn test_chat_round_trip() {
    let (base, handle) = spawn_server(vec![(
        200,
        r#"{"reply": "The cap rate is 6.2%."}"#.to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let reply = api
        .chat("sess-5", "What is the cap rate?", Some(LlmProvider::OpenAi))
        .await
        .unwrap();
    assert_eq!(reply, "The cap rate is 6.2%.");

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].url, "/api/analyze/chat");
    assert!(recorded[0].body.contains("\"session_id\":\"sess-5\""));
    assert!(recorded[0].body.contains("\"llm_provider\":\"openai\""));
}

#[tokio::test]
async fn test_health_check() {
    let (base, handle) = spawn_server(vec![(200, r#"{"status": "ok"}"#.to_string())]);
    let api = ApiClient::new(&base).unwrap();

    assert!(api.health().await.unwrap());
    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].url, "/health");
}

// ============================================================================
// Custom cards
// ============================================================================

#[tokio::test]
async fn test_list_custom_cards() {
    let (base, handle) = spawn_server(vec![(
        200,
        r#"{"cards": [{"title": "Zoning Risk", "impact": "negative", "data_evidence": "M-1 overlay"}]}"#
            .to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let cards = api.list_custom_cards("sess-7").await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Zoning Risk");

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].url, "/api/custom-cards?session_id=sess-7");
}

#[tokio::test]
async fn test_create_custom_card_round_trip() {
    let (base, handle) = spawn_server(vec![(
        200,
        r#"{"card": {"title": "Transit Access", "data_evidence": "2 blocks to light rail"}, "index": 1}"#
            .to_string(),
    )]);
    let api = ApiClient::new(&base).unwrap();

    let (card, index) = api
        .create_custom_card("sess-7", "How is transit access?")
        .await
        .unwrap();
    assert_eq!(card.title, "Transit Access");
    assert_eq!(index, 1);

    let recorded = handle.join().unwrap();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/api/custom-cards");
    assert!(recorded[0].body.contains("\"prompt\":\"How is transit access?\""));
}

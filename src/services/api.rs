//! Analysis Service HTTP Client
//!
//! Thin typed wrapper over the analysis service's REST + NDJSON endpoints.
//! Owns one `reqwest::Client`; all request/response DTOs stay private to
//! this module, the rest of the crate deals in model types.
//!
//! Error bodies follow the FastAPI convention of `{"detail": ...}`; the
//! mapping helper extracts it and turns session-scoped 404s into
//! `AppError::SessionNotFound` so callers can tell an expired session from
//! a broken service.

use leaselens_core::{CardSource, InsightCard};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::request::{AnalyzeRequest, LlmProvider};
use crate::models::session::SessionSnapshot;
use crate::utils::error::{AppError, AppResult};

/// Client for one analysis service instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str) -> AppResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::config(format!("Invalid base URL {base_url}: {e}")))?;
        let client = reqwest::Client::builder().build()?;
        Ok(Self { base, client })
    }

    /// Create a client with a caller-configured `reqwest::Client`.
    pub fn with_client(base: Url, client: reqwest::Client) -> Self {
        Self { base, client }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::config(format!("Invalid endpoint path {path}: {e}")))
    }

    /// Start a new analysis session. Returns the service-issued session id.
    pub async fn start_analysis(&self, request: &AnalyzeRequest) -> AppResult<String> {
        request.validate().map_err(AppError::validation)?;

        tracing::info!(
            "[api] starting analysis for property '{}'",
            request.property_name
        );
        let response = self
            .client
            .post(self.endpoint("/api/analyze/start")?)
            .form(&request.to_form())
            .send()
            .await?;
        let response = error_for_status(response, None).await?;
        let body: StartResponse = response.json().await?;
        Ok(body.session_id)
    }

    /// Open the analysis NDJSON event stream for a session. The response
    /// body is handed to the stream consumer; an unknown session id still
    /// answers 200 and reports itself through an in-stream `error` event.
    pub async fn open_analysis_stream(&self, session_id: &str) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .get(self.endpoint("/api/analyze/stream")?)
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        error_for_status(response, None).await
    }

    /// Fetch the restore snapshot for a finished session. 404 means the
    /// service no longer knows the session.
    pub async fn fetch_dashboard(&self, session_id: &str) -> AppResult<SessionSnapshot> {
        let response = self
            .client
            .get(self.endpoint("/api/analyze/dashboard")?)
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let response = error_for_status(response, Some(session_id)).await?;
        Ok(response.json().await?)
    }

    /// Ask a follow-up question about a session. The service answers an
    /// expired session with a friendly reply rather than an error; that
    /// reply passes through unchanged.
    pub async fn chat(
        &self,
        session_id: &str,
        message: &str,
        provider: Option<LlmProvider>,
    ) -> AppResult<String> {
        if message.trim().is_empty() {
            return Err(AppError::validation("Message cannot be empty"));
        }
        let response = self
            .client
            .post(self.endpoint("/api/analyze/chat")?)
            .json(&ChatRequest {
                session_id,
                message,
                llm_provider: provider.map(|p| p.as_str()),
            })
            .send()
            .await?;
        let response = error_for_status(response, Some(session_id)).await?;
        let body: ChatResponse = response.json().await?;
        Ok(body.reply)
    }

    /// List the user-created cards of a session.
    pub async fn list_custom_cards(&self, session_id: &str) -> AppResult<Vec<InsightCard>> {
        let response = self
            .client
            .get(self.endpoint("/api/custom-cards")?)
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let response = error_for_status(response, Some(session_id)).await?;
        let body: CardListResponse = response.json().await?;
        Ok(body.cards)
    }

    /// Create a custom card synchronously. Returns the card and its index
    /// in the session's custom list.
    pub async fn create_custom_card(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> AppResult<(InsightCard, usize)> {
        let response = self
            .client
            .post(self.endpoint("/api/custom-cards")?)
            .json(&CustomCardRequest { session_id, prompt })
            .send()
            .await?;
        let response = error_for_status(response, Some(session_id)).await?;
        let body: CreatedCardResponse = response.json().await?;
        Ok((body.card, body.index))
    }

    /// Open the streaming variant of custom-card creation. Ends with
    /// `done {card, index}`.
    pub async fn open_custom_card_stream(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint("/api/custom-cards/stream")?)
            .json(&CustomCardRequest { session_id, prompt })
            .send()
            .await?;
        error_for_status(response, Some(session_id)).await
    }

    /// Open the card-edit proposal stream. Ends with
    /// `done {original, updated, index, source}`; nothing is persisted
    /// until the edit is confirmed.
    pub async fn open_card_edit_stream(
        &self,
        session_id: &str,
        card_index: usize,
        prompt: &str,
        source: CardSource,
    ) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(&format!("/api/custom-cards/{card_index}/edit/stream"))?)
            .json(&EditRequest {
                session_id,
                prompt,
                source,
            })
            .send()
            .await?;
        error_for_status(response, Some(session_id)).await
    }

    /// Persist a proposed edit server-side. Returns the stored card.
    pub async fn confirm_card_edit(
        &self,
        session_id: &str,
        card_index: usize,
        source: CardSource,
        updated_card: &InsightCard,
    ) -> AppResult<InsightCard> {
        let response = self
            .client
            .post(self.endpoint(&format!("/api/custom-cards/{card_index}/confirm"))?)
            .json(&ConfirmRequest {
                session_id,
                source,
                updated_card,
            })
            .send()
            .await?;
        let response = error_for_status(response, Some(session_id)).await?;
        let body: ConfirmResponse = response.json().await?;
        Ok(body.updated_card)
    }

    /// Service reachability probe.
    pub async fn health(&self) -> AppResult<bool> {
        let response = self.client.get(self.endpoint("/health")?).send().await?;
        let response = error_for_status(response, None).await?;
        let body: HealthResponse = response.json().await?;
        Ok(body.status == "ok")
    }
}

/// Pass 2xx responses through; map everything else to an `AppError`.
async fn error_for_status(
    response: reqwest::Response,
    session_id: Option<&str>,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let status = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(map_api_error(status, &body, session_id))
}

fn map_api_error(status: u16, body: &str, session_id: Option<&str>) -> AppError {
    match (status, session_id) {
        (404, Some(id)) => AppError::session_not_found(id),
        _ => AppError::api(status, extract_detail(body)),
    }
}

/// FastAPI error bodies carry the message under `detail`.
fn extract_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => match parsed.detail {
            serde_json::Value::String(message) => message,
            other => other.to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

// ── Wire DTOs ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    session_id: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    llm_provider: Option<&'a str>,
}

#[derive(Serialize)]
struct CustomCardRequest<'a> {
    session_id: &'a str,
    prompt: &'a str,
}

#[derive(Serialize)]
struct EditRequest<'a> {
    session_id: &'a str,
    prompt: &'a str,
    source: CardSource,
}

#[derive(Serialize)]
struct ConfirmRequest<'a> {
    session_id: &'a str,
    source: CardSource,
    updated_card: &'a InsightCard,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    #[serde(default)]
    #[allow(dead_code)]
    ok: bool,
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Debug, Deserialize)]
struct CardListResponse {
    #[serde(default)]
    cards: Vec<InsightCard>,
}

#[derive(Debug, Deserialize)]
struct CreatedCardResponse {
    card: InsightCard,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    #[serde(default)]
    #[allow(dead_code)]
    ok: bool,
    updated_card: InsightCard,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

//! Session Service
//!
//! Orchestrates the session lifecycle around the API client: starting an
//! analysis, restoring the previous session on launch, follow-up chat, and
//! the small preference state that makes restore possible. Persistence is
//! injected through [`PrefsStore`] so embedders and tests choose the
//! backing.

use tokio_util::sync::CancellationToken;

use crate::models::request::{AnalyzeRequest, LlmProvider};
use crate::models::session::AnalysisSession;
use crate::services::api::ApiClient;
use crate::services::stream::{RunOutcome, StreamConsumer};
use crate::storage::prefs::{ClientPrefs, JsonPrefsStore, PrefsStore};
use crate::utils::error::{AppError, AppResult};

/// Result of attempting to restore a session.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// The service still knows the session; here is its state
    Restored(AnalysisSession),
    /// The service no longer knows the session (restart or expiry).
    /// Distinct from a restored-but-empty session.
    NotFound { session_id: String },
}

/// Session lifecycle orchestration over one analysis service.
pub struct SessionService<P: PrefsStore> {
    api: ApiClient,
    prefs: P,
}

impl SessionService<JsonPrefsStore> {
    /// Create a service persisting preferences at the default location.
    pub fn new(api: ApiClient) -> AppResult<Self> {
        Ok(Self {
            api,
            prefs: JsonPrefsStore::new()?,
        })
    }
}

impl<P: PrefsStore> SessionService<P> {
    /// Create a service with an injected preference store.
    pub fn with_store(api: ApiClient, prefs: P) -> Self {
        Self { api, prefs }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Start a new analysis session and remember it for restore-on-launch.
    /// The returned session is fresh; streaming happens separately via
    /// [`Self::stream`].
    pub async fn start(&self, request: &AnalyzeRequest) -> AppResult<AnalysisSession> {
        let session_id = self.api.start_analysis(request).await?;
        tracing::info!("[session] started analysis session {session_id}");

        let mut prefs = self.prefs.load()?;
        prefs.last_session_id = Some(session_id.clone());
        prefs.llm_provider = request.llm_provider;
        self.prefs.save(&prefs)?;

        Ok(AnalysisSession::new(session_id))
    }

    /// Open and consume the analysis stream for a prepared consumer.
    pub async fn open_stream(
        &self,
        consumer: &mut StreamConsumer,
        cancel: &CancellationToken,
    ) -> AppResult<RunOutcome> {
        consumer.open(&self.api, cancel).await
    }

    /// Restore a session by id from the service.
    pub async fn restore(&self, session_id: &str) -> AppResult<RestoreOutcome> {
        match self.api.fetch_dashboard(session_id).await {
            Ok(snapshot) => {
                let mut session = AnalysisSession::from_snapshot(session_id, snapshot);
                // Custom cards live behind their own endpoint; a failure
                // there degrades to an empty custom list, not a failed
                // restore
                match self.api.list_custom_cards(session_id).await {
                    Ok(cards) => session.custom_cards = cards,
                    Err(e) => tracing::warn!(
                        "[session] could not fetch custom cards for {session_id}: {e}"
                    ),
                }
                tracing::info!("[session] restored session {session_id}");
                Ok(RestoreOutcome::Restored(session))
            }
            Err(AppError::SessionNotFound { .. }) => {
                tracing::info!("[session] session {session_id} no longer known to the service");
                Ok(RestoreOutcome::NotFound {
                    session_id: session_id.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Restore the last session this client started, if any. A stale
    /// pointer (service no longer knows the session) is cleared so the next
    /// launch does not retry it.
    pub async fn restore_latest(&self) -> AppResult<Option<RestoreOutcome>> {
        let prefs = self.prefs.load()?;
        let Some(session_id) = prefs.last_session_id else {
            return Ok(None);
        };
        let outcome = self.restore(&session_id).await?;
        if matches!(outcome, RestoreOutcome::NotFound { .. }) {
            self.forget_session()?;
        }
        Ok(Some(outcome))
    }

    /// Ask a follow-up question about a session, using the preferred
    /// provider.
    pub async fn chat(&self, session_id: &str, message: &str) -> AppResult<String> {
        let provider = self.prefs.load()?.llm_provider;
        self.api.chat(session_id, message, Some(provider)).await
    }

    /// Drop the remembered session id (superseded or explicitly cleared).
    pub fn forget_session(&self) -> AppResult<()> {
        let mut prefs = self.prefs.load()?;
        prefs.last_session_id = None;
        self.prefs.save(&prefs)
    }

    /// Current preferences.
    pub fn prefs(&self) -> AppResult<ClientPrefs> {
        self.prefs.load()
    }

    /// Persist the provider preference.
    pub fn set_provider(&self, provider: LlmProvider) -> AppResult<()> {
        let mut prefs = self.prefs.load()?;
        prefs.llm_provider = provider;
        self.prefs.save(&prefs)
    }
}

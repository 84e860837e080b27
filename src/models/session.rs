//! Analysis Session Model
//!
//! Client-side state for one analysis session: the card lists, the dashboard
//! summary, and where the stream lifecycle stands. All stream-driven
//! mutation funnels through [`AnalysisSession::apply_event`] so the
//! lifecycle machine guards every write; the only sanctioned mutation after
//! a terminal status is a confirmed card edit.

use leaselens_core::{
    merge, replace_at, CardSource, CoreError, CoreResult, DashboardSummary, ImpactFilter,
    InsightCard, PropertyInfo, StreamEvent, StreamFailure, StreamStatus,
};
use serde::{Deserialize, Serialize};

/// What applying one stream event did to the session. The stream consumer
/// turns these into activity-log entries and observer updates.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Narration line to surface in the activity log
    Progress {
        message: String,
        topic: Option<String>,
    },
    /// A card batch merged in; `new` counts survivors after dedup
    CardsAdded { new: usize, total: usize },
    /// Dashboard summary replaced
    DashboardUpdated,
    /// Stream finished successfully
    Completed,
    /// Service reported a failure; session is now terminal
    Failed(StreamFailure),
    /// Event carried nothing for this session (unknown type)
    Ignored,
}

/// The restore payload for a finished (or empty) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub property: Option<PropertyInfo>,
    #[serde(default)]
    pub dashboard_summary: Option<DashboardSummary>,
    #[serde(default)]
    pub cards: Vec<InsightCard>,
}

/// Client-side state of one analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    /// Service-issued session identifier
    pub session_id: String,
    /// Creation timestamp on this client (ISO 8601)
    pub created_at: String,
    /// Property under analysis, once known
    pub property: Option<PropertyInfo>,
    /// Cards produced by the analysis stream, deduplicated, arrival order
    pub cards: Vec<InsightCard>,
    /// Cards the user created on top of the analysis
    pub custom_cards: Vec<InsightCard>,
    /// Latest dashboard summary, replaced wholesale per delivery
    pub dashboard: Option<DashboardSummary>,
    /// Stream lifecycle state
    pub status: StreamStatus,
    /// Failure details when `status` is `error`
    pub failure: Option<StreamFailure>,
    /// Malformed stream lines skipped while this session streamed
    pub skipped_lines: u64,
}

impl AnalysisSession {
    /// Create a fresh session. A new session id always starts from a clean
    /// slate; nothing carries over from a previous session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            property: None,
            cards: Vec::new(),
            custom_cards: Vec::new(),
            dashboard: None,
            status: StreamStatus::Idle,
            failure: None,
            skipped_lines: 0,
        }
    }

    /// Rebuild a session from a restore snapshot. A snapshot with a
    /// dashboard summary restores as `done`; one without restores as `idle`
    /// (nothing streamed yet), never as a fabricated in-progress state.
    pub fn from_snapshot(session_id: impl Into<String>, snapshot: SessionSnapshot) -> Self {
        let mut session = Self::new(session_id);
        session.property = snapshot
            .property
            .or_else(|| snapshot.dashboard_summary.as_ref().and_then(|d| d.property.clone()));
        session.cards = merge(&[], &snapshot.cards);
        if snapshot.dashboard_summary.is_some() {
            session.dashboard = snapshot.dashboard_summary;
            session.status = StreamStatus::Done;
        }
        session
    }

    /// Mark the stream as connecting (request about to be sent)
    pub fn mark_connecting(&mut self) -> CoreResult<()> {
        self.status.advance(StreamStatus::Connecting)
    }

    /// Mark the stream as live (2xx response, body streaming)
    pub fn mark_streaming(&mut self) -> CoreResult<()> {
        self.status.advance(StreamStatus::Streaming)
    }

    /// Terminate the session with a failure (transport, timeout, missing
    /// session). Service-reported failures arrive via `apply_event` instead.
    pub fn fail(&mut self, failure: StreamFailure) -> CoreResult<()> {
        self.status.advance(StreamStatus::Error)?;
        self.failure = Some(failure);
        Ok(())
    }

    /// Apply one stream event in arrival order.
    ///
    /// Rejected outright once the session is terminal; the lifecycle
    /// machine rejects out-of-order terminal events the same way.
    pub fn apply_event(&mut self, event: &StreamEvent) -> CoreResult<EventOutcome> {
        if self.status.is_terminal() {
            return Err(CoreError::validation(format!(
                "stream event after terminal status {}",
                self.status
            )));
        }
        match event {
            StreamEvent::Progress { message, topic } => Ok(EventOutcome::Progress {
                message: message.clone(),
                topic: topic.clone(),
            }),
            StreamEvent::Cards { cards, .. } => {
                let before = self.cards.len();
                self.cards = merge(&self.cards, cards);
                Ok(EventOutcome::CardsAdded {
                    new: self.cards.len() - before,
                    total: self.cards.len(),
                })
            }
            StreamEvent::Dashboard { data } => {
                if let Some(property) = &data.property {
                    self.property = Some(property.clone());
                }
                self.dashboard = Some(data.clone());
                Ok(EventOutcome::DashboardUpdated)
            }
            StreamEvent::Done { .. } => {
                self.status.advance(StreamStatus::Done)?;
                Ok(EventOutcome::Completed)
            }
            StreamEvent::Error { message } => {
                self.status.advance(StreamStatus::Error)?;
                let failure = StreamFailure::application(message.clone());
                self.failure = Some(failure.clone());
                Ok(EventOutcome::Failed(failure))
            }
            StreamEvent::Unknown => Ok(EventOutcome::Ignored),
        }
    }

    /// Record malformed lines the decoder skipped for this session.
    pub fn note_skipped_lines(&mut self, count: u64) {
        self.skipped_lines += count;
    }

    /// Replace one card after a confirmed edit. Allowed after `done` (it is
    /// the one post-terminal mutation); panics on an out-of-range index.
    pub fn replace_card(&mut self, source: CardSource, index: usize, updated: InsightCard) {
        match source {
            CardSource::Validation => self.cards = replace_at(&self.cards, index, updated),
            CardSource::Custom => self.custom_cards = replace_at(&self.custom_cards, index, updated),
        }
    }

    /// Append a user-created card (custom-card creation flow).
    pub fn append_custom_card(&mut self, card: InsightCard) {
        self.custom_cards.push(card);
    }

    /// The stream cards a frontend should render for the given filter.
    pub fn visible_cards(&self, filter: ImpactFilter) -> Vec<InsightCard> {
        leaselens_core::display_cards(&self.cards, filter)
    }
}

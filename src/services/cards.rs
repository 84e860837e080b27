//! Card Edit and Creation Flows
//!
//! The modal flow for refining an insight card with a follow-up prompt, and
//! the streaming creation of user-requested custom cards. The edit flow is
//! an explicit state machine: each phase names what the frontend may do
//! next, and illegal jumps fail loudly instead of leaving a stale modal on
//! screen. The session's card lists change only after the service confirms.

use std::fmt;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use leaselens_core::{CardSource, CoreError, InsightCard, StreamEvent};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::models::session::AnalysisSession;
use crate::services::api::ApiClient;
use crate::services::stream::{ActivityLog, LogEntry, LogKind, NdjsonDecoder, StreamConfig};
use crate::utils::error::{AppError, AppResult};

/// Phase of the card-edit modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPhase {
    /// No edit in flight
    #[default]
    Idle,
    /// Edit stream open; proposal being generated
    Proposing,
    /// Proposal ready; waiting for the user's decision
    Review,
    /// Confirm request in flight
    Confirming,
    /// Edit confirmed and applied locally
    Applied,
    /// Proposal or confirmation failed
    Failed,
}

impl EditPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditPhase::Idle => "idle",
            EditPhase::Proposing => "proposing",
            EditPhase::Review => "review",
            EditPhase::Confirming => "confirming",
            EditPhase::Applied => "applied",
            EditPhase::Failed => "failed",
        }
    }

    /// Legal phase transitions. `Review -> Idle` is a discard;
    /// `Applied | Failed -> Idle` is a reset for the next edit.
    pub fn can_transition_to(&self, next: EditPhase) -> bool {
        matches!(
            (self, next),
            (EditPhase::Idle, EditPhase::Proposing)
                | (EditPhase::Proposing, EditPhase::Review)
                | (EditPhase::Proposing, EditPhase::Failed)
                | (EditPhase::Review, EditPhase::Confirming)
                | (EditPhase::Review, EditPhase::Idle)
                | (EditPhase::Confirming, EditPhase::Applied)
                | (EditPhase::Confirming, EditPhase::Failed)
                | (EditPhase::Applied, EditPhase::Idle)
                | (EditPhase::Failed, EditPhase::Idle)
        )
    }
}

impl fmt::Display for EditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed edit awaiting the user's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditReview {
    pub card_index: usize,
    pub source: CardSource,
    pub original: InsightCard,
    pub updated: InsightCard,
}

/// Drives one card edit at a time through the phase machine.
pub struct CardEditor {
    phase: EditPhase,
    review: Option<EditReview>,
    failure: Option<String>,
    log: ActivityLog,
    config: StreamConfig,
}

impl CardEditor {
    pub fn new(config: StreamConfig) -> Self {
        let log = ActivityLog::new(&config);
        Self {
            phase: EditPhase::Idle,
            review: None,
            failure: None,
            log,
            config,
        }
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn review(&self) -> Option<&EditReview> {
        self.review.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Progress log for the in-flight proposal.
    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    fn advance(&mut self, next: EditPhase) -> AppResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(CoreError::transition(self.phase.as_str(), next.as_str()).into());
        }
        tracing::debug!("[cards] edit phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Open the edit stream and consume it to a proposal. Runtime failures
    /// (transport drop, service `error` event, truncated stream, cancel)
    /// land in `Failed` with a message; `Err` is reserved for calling this
    /// out of phase.
    pub async fn propose(
        &mut self,
        api: &ApiClient,
        session_id: &str,
        card_index: usize,
        prompt: &str,
        source: CardSource,
        cancel: &CancellationToken,
    ) -> AppResult<EditPhase> {
        if prompt.trim().is_empty() {
            return Err(AppError::validation("Edit prompt cannot be empty"));
        }
        self.advance(EditPhase::Proposing)?;
        self.review = None;
        self.failure = None;
        self.log = ActivityLog::new(&self.config);

        let response = match api
            .open_card_edit_stream(session_id, card_index, prompt, source)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("[cards] failed to open edit stream: {e}");
                return self.fail(e.to_string()).await;
            }
        };
        tracing::info!(
            "[cards] proposing edit for {} card {card_index} in session {session_id}",
            source.as_str()
        );

        self.run_proposal(response.bytes_stream(), card_index, source, cancel)
            .await
    }

    /// Consume an edit stream. Public so tests can feed any chunk source;
    /// [`Self::propose`] is the usual entry point.
    pub async fn run_proposal<S, E>(
        &mut self,
        mut stream: S,
        card_index: usize,
        source: CardSource,
        cancel: &CancellationToken,
    ) -> AppResult<EditPhase>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: fmt::Display,
    {
        let mut decoder = NdjsonDecoder::new();
        let mut reveal = tokio::time::interval(self.config.reveal_interval);
        reveal.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut idle_deadline = tokio::time::Instant::now() + self.config.idle_timeout;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("[cards] edit proposal cancelled");
                    return self.fail("Edit cancelled").await;
                }

                _ = reveal.tick() => {
                    self.log.tick(Instant::now());
                }

                chunk = stream.next() => {
                    idle_deadline = tokio::time::Instant::now() + self.config.idle_timeout;
                    match chunk {
                        Some(Ok(bytes)) => {
                            for event in decoder.push(&bytes) {
                                if let Some(phase) =
                                    self.apply_proposal_event(event, card_index, source).await?
                                {
                                    return Ok(phase);
                                }
                            }
                        }
                        Some(Err(e)) => {
                            return self.fail(e.to_string()).await;
                        }
                        None => {
                            for event in decoder.finish() {
                                if let Some(phase) =
                                    self.apply_proposal_event(event, card_index, source).await?
                                {
                                    return Ok(phase);
                                }
                            }
                            return self.fail("Edit stream closed before completion").await;
                        }
                    }
                }

                _ = tokio::time::sleep_until(idle_deadline) => {
                    return self
                        .fail(format!(
                            "No edit stream data received for {}s",
                            self.config.idle_timeout.as_secs()
                        ))
                        .await;
                }
            }
        }
    }

    /// Apply one edit-stream event. Returns the terminal phase once the
    /// proposal resolves.
    async fn apply_proposal_event(
        &mut self,
        event: StreamEvent,
        card_index: usize,
        source: CardSource,
    ) -> AppResult<Option<EditPhase>> {
        match event {
            StreamEvent::Progress { message, topic } => {
                let mut entry = LogEntry::new(LogKind::Progress, message);
                if let Some(topic) = topic {
                    entry = entry.with_topic(topic);
                }
                self.log.push(entry);
                Ok(None)
            }
            StreamEvent::Done {
                index,
                original,
                updated,
                source: event_source,
                ..
            } => {
                let Some(updated) = updated else {
                    return self.fail("Edit stream ended without an updated card").await.map(Some);
                };
                let original = original.unwrap_or_else(|| updated.clone());
                self.review = Some(EditReview {
                    card_index: index.unwrap_or(card_index),
                    source: event_source.unwrap_or(source),
                    original,
                    updated,
                });
                self.log.push(LogEntry::new(LogKind::Done, "Edit proposal ready"));
                self.log.reveal_all();
                self.advance(EditPhase::Review)?;
                Ok(Some(EditPhase::Review))
            }
            StreamEvent::Error { message } => self.fail(message).await.map(Some),
            // Edit streams carry no card batches or dashboards
            _ => Ok(None),
        }
    }

    /// Confirm the reviewed proposal with the service, then apply it to the
    /// session. The local card changes only after the service accepts.
    pub async fn confirm(
        &mut self,
        api: &ApiClient,
        session: &mut AnalysisSession,
    ) -> AppResult<EditPhase> {
        self.advance(EditPhase::Confirming)?;
        let Some(review) = self.review.clone() else {
            return Err(AppError::internal("No proposed edit to confirm"));
        };

        match api
            .confirm_card_edit(
                &session.session_id,
                review.card_index,
                review.source,
                &review.updated,
            )
            .await
        {
            Ok(updated) => {
                session.replace_card(review.source, review.card_index, updated);
                self.advance(EditPhase::Applied)?;
                tracing::info!(
                    "[cards] applied edit to {} card {} in session {}",
                    review.source.as_str(),
                    review.card_index,
                    session.session_id
                );
                Ok(EditPhase::Applied)
            }
            Err(e) => {
                tracing::warn!("[cards] edit confirmation rejected: {e}");
                self.failure = Some(e.to_string());
                self.advance(EditPhase::Failed)?;
                Ok(EditPhase::Failed)
            }
        }
    }

    /// Throw the proposal away without applying it.
    pub fn discard(&mut self) -> AppResult<()> {
        self.advance(EditPhase::Idle)?;
        self.clear();
        Ok(())
    }

    /// Return to `Idle` after an applied or failed edit.
    pub fn reset(&mut self) -> AppResult<()> {
        self.advance(EditPhase::Idle)?;
        self.clear();
        Ok(())
    }

    async fn fail(&mut self, message: impl Into<String>) -> AppResult<EditPhase> {
        let message = message.into();
        self.log.push(LogEntry::new(LogKind::Error, message.clone()));
        self.log.reveal_all();
        self.failure = Some(message);
        self.advance(EditPhase::Failed)?;
        Ok(EditPhase::Failed)
    }

    fn clear(&mut self) {
        self.review = None;
        self.failure = None;
        self.log = ActivityLog::new(&self.config);
    }
}

/// Outcome of a streaming custom-card creation.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Card generated and appended to the session's custom list
    Created { index: usize },
    /// Service reported an error or the stream broke
    Failed { message: String },
    /// Caller cancelled; the session is untouched
    Cancelled,
}

/// Generate a custom card from a prompt over the creation stream and append
/// it to the session on completion.
pub async fn create_custom(
    api: &ApiClient,
    session: &mut AnalysisSession,
    prompt: &str,
    config: &StreamConfig,
    cancel: &CancellationToken,
) -> AppResult<CreateOutcome> {
    if prompt.trim().is_empty() {
        return Err(AppError::validation("Card prompt cannot be empty"));
    }

    let response = match api
        .open_custom_card_stream(&session.session_id, prompt)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("[cards] failed to open creation stream: {e}");
            return Ok(CreateOutcome::Failed {
                message: e.to_string(),
            });
        }
    };
    tracing::info!(
        "[cards] creating custom card for session {}",
        session.session_id
    );

    run_creation(response.bytes_stream(), session, config, cancel).await
}

/// Consume a custom-card creation stream. Public so tests can feed any
/// chunk source.
pub async fn run_creation<S, E>(
    mut stream: S,
    session: &mut AnalysisSession,
    config: &StreamConfig,
    cancel: &CancellationToken,
) -> AppResult<CreateOutcome>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    let mut decoder = NdjsonDecoder::new();
    let mut idle_deadline = tokio::time::Instant::now() + config.idle_timeout;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::info!("[cards] custom card creation cancelled");
                return Ok(CreateOutcome::Cancelled);
            }

            chunk = stream.next() => {
                idle_deadline = tokio::time::Instant::now() + config.idle_timeout;
                match chunk {
                    Some(Ok(bytes)) => {
                        for event in decoder.push(&bytes) {
                            if let Some(outcome) = apply_creation_event(event, session) {
                                return Ok(outcome);
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Ok(CreateOutcome::Failed { message: e.to_string() });
                    }
                    None => {
                        for event in decoder.finish() {
                            if let Some(outcome) = apply_creation_event(event, session) {
                                return Ok(outcome);
                            }
                        }
                        return Ok(CreateOutcome::Failed {
                            message: "Creation stream closed before completion".to_string(),
                        });
                    }
                }
            }

            _ = tokio::time::sleep_until(idle_deadline) => {
                return Ok(CreateOutcome::Failed {
                    message: "Creation stream stalled".to_string(),
                });
            }
        }
    }
}

fn apply_creation_event(
    event: StreamEvent,
    session: &mut AnalysisSession,
) -> Option<CreateOutcome> {
    match event {
        StreamEvent::Progress { message, .. } => {
            tracing::debug!("[cards] creation progress: {message}");
            None
        }
        StreamEvent::Done { card, index, .. } => {
            let Some(card) = card else {
                return Some(CreateOutcome::Failed {
                    message: "Creation stream ended without a card".to_string(),
                });
            };
            session.append_custom_card(card);
            let index = index.unwrap_or(session.custom_cards.len() - 1);
            Some(CreateOutcome::Created { index })
        }
        StreamEvent::Error { message } => Some(CreateOutcome::Failed { message }),
        _ => None,
    }
}

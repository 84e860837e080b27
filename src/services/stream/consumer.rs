//! Stream Consumer
//!
//! The sequential event loop for one analysis session: pulls body chunks,
//! decodes them, applies events to the session in arrival order, and drives
//! the activity-log animation clock. Cancellation is checked before any
//! other work on every iteration, so once the caller cancels, no further
//! event touches the session.
//!
//! Progress flows to an optional observer channel; a closed observer never
//! stalls consumption.

use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use leaselens_core::{StreamEvent, StreamFailure, StreamStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::activity_log::{ActivityLog, LogEntry, LogKind};
use super::decoder::NdjsonDecoder;
use super::StreamConfig;
use crate::models::session::{AnalysisSession, EventOutcome};
use crate::services::api::ApiClient;
use crate::utils::error::AppResult;

/// Observer updates emitted while a stream is consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Lifecycle state changed
    Status(StreamStatus),
    /// A log entry was appended (not necessarily revealed yet)
    Log(LogEntry),
    /// A card batch merged in
    CardsAdded { new: usize, total: usize },
    /// Dashboard summary replaced
    DashboardUpdated,
    /// One-shot signal after `done` and the settle delay; frontends switch
    /// from the log to the dashboard when this arrives
    AnalysisComplete,
}

/// How a consume loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The stream reached a terminal state (done or error)
    Finished,
    /// The caller cancelled; session state is frozen where it was
    Cancelled,
}

/// Consumes one analysis stream into one session.
pub struct StreamConsumer {
    session: AnalysisSession,
    log: ActivityLog,
    decoder: NdjsonDecoder,
    config: StreamConfig,
    update_tx: Option<mpsc::Sender<SessionUpdate>>,
}

impl StreamConsumer {
    pub fn new(session: AnalysisSession, config: StreamConfig) -> Self {
        let log = ActivityLog::new(&config);
        Self {
            session,
            log,
            decoder: NdjsonDecoder::new(),
            config,
            update_tx: None,
        }
    }

    /// Attach an observer channel. Send failures are ignored; a vanished
    /// observer must not stop the stream.
    pub fn with_updates(mut self, tx: mpsc::Sender<SessionUpdate>) -> Self {
        self.update_tx = Some(tx);
        self
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn into_session(self) -> AnalysisSession {
        self.session
    }

    /// Open the analysis stream for the held session and consume it to
    /// completion. A blank session id fails immediately with
    /// `missing_session` and never touches the network.
    pub async fn open(
        &mut self,
        api: &ApiClient,
        cancel: &CancellationToken,
    ) -> AppResult<RunOutcome> {
        if self.session.session_id.trim().is_empty() {
            self.session.fail(StreamFailure::missing_session())?;
            self.send_update(SessionUpdate::Status(StreamStatus::Error)).await;
            return Ok(RunOutcome::Finished);
        }

        self.session.mark_connecting()?;
        self.send_update(SessionUpdate::Status(StreamStatus::Connecting)).await;

        let response = match api.open_analysis_stream(&self.session.session_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    "[stream] failed to open stream for session {}: {}",
                    self.session.session_id,
                    e
                );
                self.fail_with_log(StreamFailure::transport(e.to_string())).await?;
                return Ok(RunOutcome::Finished);
            }
        };

        self.session.mark_streaming()?;
        self.send_update(SessionUpdate::Status(StreamStatus::Streaming)).await;
        tracing::info!(
            "[stream] consuming analysis stream for session {}",
            self.session.session_id
        );

        self.run(response.bytes_stream(), cancel).await
    }

    /// Consume a body stream. The session must already be `streaming`;
    /// [`Self::open`] is the usual entry point, this one exists so embedders
    /// and tests can feed any chunk source.
    pub async fn run<S, E>(&mut self, mut stream: S, cancel: &CancellationToken) -> AppResult<RunOutcome>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let mut reveal = tokio::time::interval(self.config.reveal_interval);
        reveal.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut idle_deadline = tokio::time::Instant::now() + self.config.idle_timeout;

        loop {
            tokio::select! {
                // Cancellation wins over ready data; nothing decoded after
                // it is ever applied
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!(
                        "[stream] cancelled for session {}",
                        self.session.session_id
                    );
                    return Ok(RunOutcome::Cancelled);
                }

                _ = reveal.tick() => {
                    self.log.tick(Instant::now());
                }

                chunk = stream.next() => {
                    idle_deadline = tokio::time::Instant::now() + self.config.idle_timeout;
                    match chunk {
                        Some(Ok(bytes)) => {
                            let events = self.decoder.push(&bytes);
                            self.sync_skipped();
                            if self.apply_events(events).await? {
                                return self.settle_after_terminal(cancel).await;
                            }
                        }
                        Some(Err(e)) => {
                            self.fail_with_log(StreamFailure::transport(e.to_string())).await?;
                            return Ok(RunOutcome::Finished);
                        }
                        None => {
                            let events = self.decoder.finish();
                            self.sync_skipped();
                            if self.apply_events(events).await? {
                                return self.settle_after_terminal(cancel).await;
                            }
                            self.fail_with_log(StreamFailure::incomplete(
                                "Stream closed before completion",
                            ))
                            .await?;
                            return Ok(RunOutcome::Finished);
                        }
                    }
                }

                _ = tokio::time::sleep_until(idle_deadline) => {
                    self.fail_with_log(StreamFailure::incomplete(format!(
                        "No stream data received for {}s",
                        self.config.idle_timeout.as_secs()
                    )))
                    .await?;
                    return Ok(RunOutcome::Finished);
                }
            }
        }
    }

    /// Apply decoded events in order. Returns true once the session is
    /// terminal; trailing events in the same chunk are dropped.
    async fn apply_events(&mut self, events: Vec<StreamEvent>) -> AppResult<bool> {
        for event in events {
            if self.session.status.is_terminal() {
                break;
            }
            match self.session.apply_event(&event)? {
                EventOutcome::Progress { message, topic } => {
                    let mut entry = LogEntry::new(LogKind::Progress, message);
                    if let Some(topic) = topic {
                        entry = entry.with_topic(topic);
                    }
                    self.push_log(entry).await;
                }
                EventOutcome::CardsAdded { new, total } => {
                    self.push_log(LogEntry::new(
                        LogKind::Cards,
                        format!("Added {new} cards ({total} total)"),
                    ))
                    .await;
                    self.send_update(SessionUpdate::CardsAdded { new, total }).await;
                }
                EventOutcome::DashboardUpdated => {
                    self.push_log(LogEntry::new(LogKind::Dashboard, "Dashboard summary updated"))
                        .await;
                    self.send_update(SessionUpdate::DashboardUpdated).await;
                }
                EventOutcome::Completed => {
                    self.push_log(LogEntry::new(LogKind::Done, "Analysis complete")).await;
                    self.log.reveal_all();
                    self.send_update(SessionUpdate::Status(StreamStatus::Done)).await;
                }
                EventOutcome::Failed(failure) => {
                    self.push_log(LogEntry::new(LogKind::Error, failure.message.clone())).await;
                    self.log.reveal_all();
                    self.send_update(SessionUpdate::Status(StreamStatus::Error)).await;
                }
                EventOutcome::Ignored => {}
            }
        }
        Ok(self.session.status.is_terminal())
    }

    /// After `done`, hold for the settle delay before signalling
    /// completion; cancellation during the delay suppresses the signal.
    /// Failures settle immediately.
    async fn settle_after_terminal(&mut self, cancel: &CancellationToken) -> AppResult<RunOutcome> {
        if self.session.status != StreamStatus::Done {
            return Ok(RunOutcome::Finished);
        }
        tokio::select! {
            biased;

            _ = cancel.cancelled() => Ok(RunOutcome::Cancelled),
            _ = tokio::time::sleep(self.config.done_delay) => {
                self.send_update(SessionUpdate::AnalysisComplete).await;
                Ok(RunOutcome::Finished)
            }
        }
    }

    async fn fail_with_log(&mut self, failure: StreamFailure) -> AppResult<()> {
        self.push_log(LogEntry::new(LogKind::Error, failure.message.clone())).await;
        self.log.reveal_all();
        self.session.fail(failure)?;
        self.send_update(SessionUpdate::Status(StreamStatus::Error)).await;
        Ok(())
    }

    async fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry.clone());
        self.send_update(SessionUpdate::Log(entry)).await;
    }

    fn sync_skipped(&mut self) {
        let skipped = self.decoder.take_skipped();
        if skipped > 0 {
            self.session.note_skipped_lines(skipped);
        }
    }

    async fn send_update(&self, update: SessionUpdate) {
        if let Some(tx) = &self.update_tx {
            let _ = tx.send(update).await;
        }
    }
}

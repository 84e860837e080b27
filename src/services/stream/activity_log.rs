//! Activity Log
//!
//! Narration window over the analysis stream. Entries are appended the
//! moment their event arrives but revealed one at a time on an animation
//! clock, so the log reads as steady progress even when the service bursts.
//! The full record is append-only; only the visible window ever shrinks.
//!
//! The clock is passed in (`tick(now)`) rather than read, which keeps every
//! timing path testable with synthetic instants.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::StreamConfig;

/// What kind of stream event a log entry narrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Progress,
    Cards,
    Dashboard,
    Done,
    Error,
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    /// Research topic attached to progress lines, when the phase has one
    #[serde(default)]
    pub topic: Option<String>,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// Staggered-reveal window over an append-only entry record.
///
/// Layout of `entries`:
///
/// ```text
/// [ retired ... | exiting ... | solid ... | pending ... ]
///               ^ window_start            ^ revealed
/// ```
///
/// Exiting entries are contiguous at the window head; they stay rendered
/// (fading) until their deadline passes, then retire. Pending entries have
/// arrived but not yet been revealed by the clock.
#[derive(Debug)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    revealed: usize,
    window_start: usize,
    /// Exit deadlines for the entries at the window head, oldest first
    exiting: VecDeque<Instant>,
    reveal_interval: std::time::Duration,
    exit_duration: std::time::Duration,
    max_visible: usize,
    last_reveal: Option<Instant>,
}

impl ActivityLog {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            entries: Vec::new(),
            revealed: 0,
            window_start: 0,
            exiting: VecDeque::new(),
            reveal_interval: config.reveal_interval,
            exit_duration: config.exit_duration,
            max_visible: config.max_visible,
            last_reveal: None,
        }
    }

    /// Append an entry. The record only ever grows; reveal happens later on
    /// the clock.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Advance the animation clock: retire entries whose exit finished,
    /// then reveal at most one pending entry if the reveal interval has
    /// elapsed. Revealing into a full window schedules the oldest solid
    /// entry to exit.
    pub fn tick(&mut self, now: Instant) {
        while let Some(&deadline) = self.exiting.front() {
            if deadline > now {
                break;
            }
            self.exiting.pop_front();
            self.window_start += 1;
        }

        if self.revealed < self.entries.len() {
            let due = match self.last_reveal {
                Some(at) => now.duration_since(at) >= self.reveal_interval,
                None => true,
            };
            if due {
                if self.solid_len() >= self.max_visible {
                    self.exiting.push_back(now + self.exit_duration);
                }
                self.revealed += 1;
                self.last_reveal = Some(now);
            }
        }
    }

    /// Terminal short-circuit: reveal everything at once and stop retiring.
    /// Used when the stream reaches `done` or `error`.
    pub fn reveal_all(&mut self) {
        self.revealed = self.entries.len();
        self.exiting.clear();
    }

    /// Entries currently rendered, exiting ones first.
    pub fn visible(&self) -> &[LogEntry] {
        &self.entries[self.window_start..self.revealed]
    }

    /// How many of [`Self::visible`]'s leading entries are mid-exit.
    pub fn exiting_count(&self) -> usize {
        self.exiting.len()
    }

    /// Every entry that has arrived, revealed or not.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// How many entries have been revealed so far. Monotone, never exceeds
    /// the record length.
    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    fn visible_len(&self) -> usize {
        self.revealed - self.window_start
    }

    fn solid_len(&self) -> usize {
        self.visible_len() - self.exiting.len()
    }
}

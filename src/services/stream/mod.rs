//! Analysis Stream Consumption
//!
//! Everything between raw HTTP body chunks and reconciled session state:
//! - `decoder` - NDJSON chunk decoding with malformed-line tolerance
//! - `activity_log` - staggered-reveal narration window
//! - `consumer` - the sequential event loop driving one session

pub mod activity_log;
pub mod consumer;
pub mod decoder;

use std::time::Duration;

// Re-export main types
pub use activity_log::{ActivityLog, LogEntry, LogKind};
pub use consumer::{RunOutcome, SessionUpdate, StreamConsumer};
pub use decoder::NdjsonDecoder;

/// Tunables for stream consumption and log animation. Defaults mirror the
/// production frontend timings; tests shrink them.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Gap between two activity-log reveals
    pub reveal_interval: Duration,
    /// How long a retiring log entry stays visible while exiting
    pub exit_duration: Duration,
    /// Cap on fully visible log entries
    pub max_visible: usize,
    /// Stream silence after which the session fails as incomplete
    pub idle_timeout: Duration,
    /// Pause between the `done` event and the completion signal, giving the
    /// log time to settle before the dashboard takes over
    pub done_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(320),
            exit_duration: Duration::from_millis(450),
            max_visible: 6,
            idle_timeout: Duration::from_secs(120),
            done_delay: Duration::from_secs(5),
        }
    }
}

//! Stream Event Types
//!
//! Wire model for the NDJSON event streams the analysis service emits: one
//! JSON object per line, discriminated by a `type` field. One enum covers all
//! three stream shapes the service serves (analysis, custom-card creation,
//! card edit) since they share the envelope and differ only in which optional
//! `done` fields are populated.
//!
//! Parsing is tolerant by construction: unrecognized event types map to
//! `Unknown` instead of failing, and optional payload fields default rather
//! than erroring.

use serde::{Deserialize, Serialize};

use crate::card::InsightCard;
use crate::dashboard::DashboardSummary;

/// Which session card list an edited card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
    /// Cards produced by the analysis stream itself.
    Validation,
    /// Cards the user created on top of the analysis.
    Custom,
}

impl CardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardSource::Validation => "validation",
            CardSource::Custom => "custom",
        }
    }
}

/// One line of an analysis NDJSON stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Narration of what the analysis is currently doing.
    Progress {
        #[serde(default)]
        message: String,
        /// Topic currently under research, when the phase has one.
        #[serde(default)]
        topic: Option<String>,
    },

    /// A batch of newly produced insight cards.
    Cards {
        #[serde(default)]
        cards: Vec<InsightCard>,
        #[serde(default)]
        batch_index: Option<u32>,
    },

    /// Full dashboard summary. Replaces any previously held summary
    /// wholesale; the service never sends partial updates.
    Dashboard { data: DashboardSummary },

    /// Terminal success. The analysis stream sends it bare; the creation
    /// stream populates `card`/`index`; the edit stream populates
    /// `original`/`updated`/`index`/`source`.
    Done {
        #[serde(default)]
        card: Option<InsightCard>,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        original: Option<InsightCard>,
        #[serde(default)]
        updated: Option<InsightCard>,
        #[serde(default)]
        source: Option<CardSource>,
    },

    /// Terminal failure with a human-readable message.
    Error {
        #[serde(default)]
        message: String,
    },

    /// Forward-compatibility catch-all for event types this client does not
    /// know. Ignored by consumers.
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Whether this event ends the stream (no further events are applied
    /// after it).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }
}

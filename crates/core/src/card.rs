//! Insight Card Model
//!
//! The unit of analysis output: one finding about a lease, scored and
//! categorized by impact. Cards arrive over the event stream in batches and
//! may be partial or degenerate (LLM output), so every wire field is optional
//! and parsing never fails on a missing field.
//!
//! Displayability is decided here: a card renders only if it has a title and
//! at least one substantive body text. "No data found"-style placeholder
//! bodies do not count as substantive.

use serde::{Deserialize, Serialize};

/// Impact direction of a card for the selected analysis perspective.
///
/// Unknown strings and absent values fold to `Neutral` rather than failing
/// the enclosing card batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Impact {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl From<String> for Impact {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Impact::Positive,
            "negative" => Impact::Negative,
            _ => Impact::Neutral,
        }
    }
}

impl Impact {
    /// Display ordering rank: positive findings sort before neutral, neutral
    /// before negative.
    pub fn rank(&self) -> u8 {
        match self {
            Impact::Positive => 0,
            Impact::Neutral => 1,
            Impact::Negative => 2,
        }
    }
}

/// A single lease-analysis finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InsightCard {
    /// Human-facing topic name. Also the card's identity for deduplication
    /// (trimmed, case-insensitive). Empty means the card is not displayable.
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub impact: Impact,

    /// Model confidence, 0-100.
    #[serde(default)]
    pub confidence_score: Option<f64>,

    /// One-line takeaway.
    #[serde(default)]
    pub insight: Option<String>,

    /// Supporting evidence text. Primary displayability signal.
    #[serde(default)]
    pub data_evidence: Option<String>,

    #[serde(default)]
    pub why_it_matters: Option<String>,

    /// Where the evidence came from (e.g. "web search", "lease document").
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub source_url: Option<String>,

    /// Market baseline percentage for the topic, 0-100.
    #[serde(default)]
    pub baseline_pct: Option<f64>,

    /// Current trend percentage for the topic, 0-100.
    #[serde(default)]
    pub current_trend_pct: Option<f64>,
}

/// Placeholder bodies the generators emit when a topic yielded nothing.
/// Matched exactly after normalization, never by substring, so real prose
/// that happens to mention "no data" is retained.
const PLACEHOLDER_TEXTS: &[&str] = &[
    "no data",
    "no data found",
    "no data available",
    "data not available",
    "insufficient data",
    "n/a",
    "na",
    "none",
    "no evidence",
    "not available",
    "unavailable",
    "not applicable",
];

fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = lowered.strip_suffix('.').unwrap_or(&lowered);
    stripped.trim_end().to_string()
}

/// Whether a body text is a known "nothing found" placeholder.
pub fn is_placeholder(text: &str) -> bool {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return true;
    }
    if normalized.chars().all(|c| matches!(c, '-' | '\u{2013}' | '\u{2014}')) {
        return true;
    }
    PLACEHOLDER_TEXTS.contains(&normalized.as_str())
}

fn is_substantive(text: Option<&str>) -> bool {
    match text {
        Some(t) => !t.trim().is_empty() && !is_placeholder(t),
        None => false,
    }
}

impl InsightCard {
    /// Identity key for deduplication: trimmed, lowercased title. Empty keys
    /// never participate in dedup.
    pub fn dedup_key(&self) -> String {
        self.title.trim().to_lowercase()
    }

    /// A card renders only with a non-blank title and at least one
    /// substantive body (evidence or insight). Placeholder bodies like
    /// "No data found" do not qualify.
    pub fn is_displayable(&self) -> bool {
        if self.title.trim().is_empty() {
            return false;
        }
        is_substantive(self.data_evidence.as_deref()) || is_substantive(self.insight.as_deref())
    }

    /// Baseline percentage clamped to the displayable 0-100 range.
    pub fn clamped_baseline_pct(&self) -> Option<f64> {
        self.baseline_pct.map(|v| v.clamp(0.0, 100.0))
    }

    /// Trend percentage clamped to the displayable 0-100 range.
    pub fn clamped_trend_pct(&self) -> Option<f64> {
        self.current_trend_pct.map(|v| v.clamp(0.0, 100.0))
    }
}

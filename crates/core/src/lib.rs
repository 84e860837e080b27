//! LeaseLens Core
//!
//! Foundational types and pure logic for the LeaseLens workspace: the wire
//! model of the analysis event stream, the insight-card data model with its
//! displayability rules, card reconciliation, and the stream lifecycle state
//! machine. This crate has zero dependencies on application-level code
//! (HTTP client, storage, async runtime).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `events` - NDJSON stream event union (`StreamEvent`, `CardSource`)
//! - `card` - Insight card model, impact, displayability (`InsightCard`, `Impact`)
//! - `dashboard` - Dashboard summary payload (`DashboardSummary`)
//! - `status` - Stream lifecycle machine (`StreamStatus`, `StreamFailure`)
//! - `reconcile` - Pure card-list reconciliation (merge, sort, filter)
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Tolerant parsing** - degenerate LLM output never fails a whole batch
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod card;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod reconcile;
pub mod status;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Stream Events ──────────────────────────────────────────────────────
pub use events::{CardSource, StreamEvent};

// ── Card Model ─────────────────────────────────────────────────────────
pub use card::{is_placeholder, Impact, InsightCard};

// ── Dashboard ──────────────────────────────────────────────────────────
pub use dashboard::{DashboardSummary, PortfolioContext, PropertyInfo, Recommendations};

// ── Stream Lifecycle ───────────────────────────────────────────────────
pub use status::{FailureKind, StreamFailure, StreamStatus};

// ── Reconciliation ─────────────────────────────────────────────────────
pub use reconcile::{
    display_cards, effective_filter, merge, replace_at, sort_for_display, ImpactFilter,
};

//! LeaseLens Client Library
//!
//! Client core for the lease-analysis service: an HTTP/NDJSON client, the
//! session state it maintains, and the presentation logic frontends bind to.
//! It includes:
//! - The API client for the analysis service endpoints
//! - The stream consumer, activity log, and card edit flows
//! - Session lifecycle and restore-on-launch
//! - Preference storage and utilities
//!
//! Pure domain logic (cards, events, reconciliation, status machine) lives
//! in the `leaselens_core` crate; this crate adds the I/O around it.

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export the domain crate so embedders need only one dependency
pub use leaselens_core as core;

pub use models::request::{AnalyzeRequest, LlmProvider, Role};
pub use models::session::{AnalysisSession, EventOutcome, SessionSnapshot};
pub use services::{
    create_custom, ApiClient, CardEditor, CreateOutcome, EditPhase, EditReview, RestoreOutcome,
    RunOutcome, SessionService, SessionUpdate, StreamConfig, StreamConsumer,
};
pub use storage::prefs::{ClientPrefs, JsonPrefsStore, MemoryPrefsStore, PrefsStore};
pub use utils::error::{AppError, AppResult};

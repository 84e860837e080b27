//! Services
//!
//! Client-side orchestration: the HTTP client for the analysis service, the
//! stream consumer and its activity log, session lifecycle, and the card
//! edit/creation flows. Services own the side effects; `leaselens_core`
//! keeps the pure logic.

pub mod api;
pub mod cards;
pub mod session;
pub mod stream;

pub use api::ApiClient;
pub use cards::{create_custom, CardEditor, CreateOutcome, EditPhase, EditReview};
pub use session::{RestoreOutcome, SessionService};
pub use stream::{
    ActivityLog, LogEntry, LogKind, NdjsonDecoder, RunOutcome, SessionUpdate, StreamConfig,
    StreamConsumer,
};

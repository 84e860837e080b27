//! Stream Lifecycle State Machine
//!
//! One analysis stream moves through a small fixed lifecycle. Transitions
//! are an explicit table and anything outside it is rejected with an error,
//! so a coding mistake (applying events after `done`, reopening a failed
//! stream) surfaces immediately instead of silently corrupting session
//! state.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Lifecycle state of one analysis stream.
///
/// ```text
/// idle -> connecting -> streaming -> done
///   \         \             \-----> error
///    \         \------------------> error
///     \---------------------------> error   (precondition failures)
/// ```
///
/// `done` and `error` are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Done,
    Error,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Idle => "idle",
            StreamStatus::Connecting => "connecting",
            StreamStatus::Streaming => "streaming",
            StreamStatus::Done => "done",
            StreamStatus::Error => "error",
        }
    }

    /// Terminal states accept no further transitions or stream events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamStatus::Done | StreamStatus::Error)
    }

    /// The legal transition table. Everything not listed is illegal,
    /// including every edge out of a terminal state.
    pub fn can_transition_to(&self, next: StreamStatus) -> bool {
        use StreamStatus::*;
        matches!(
            (self, next),
            (Idle, Connecting) | (Idle, Error) | (Connecting, Streaming) | (Connecting, Error) | (Streaming, Done) | (Streaming, Error)
        )
    }

    /// Move to `next`, rejecting illegal transitions loudly.
    pub fn advance(&mut self, next: StreamStatus) -> CoreResult<()> {
        if !self.can_transition_to(next) {
            return Err(CoreError::transition(self.as_str(), next.as_str()));
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stream ended in `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Precondition failure: no session id to stream for. No request is
    /// made.
    MissingSession,
    /// The connection could not be established or broke mid-stream
    /// (non-2xx open, network error).
    Transport,
    /// The service itself reported a failure via an `error` event.
    Application,
    /// The stream went silent past the idle timeout or closed without a
    /// terminal event.
    Incomplete,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MissingSession => "missing_session",
            FailureKind::Transport => "transport",
            FailureKind::Application => "application",
            FailureKind::Incomplete => "incomplete",
        }
    }
}

/// Terminal failure details attached to a session that ended in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl StreamFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_session() -> Self {
        Self::new(
            FailureKind::MissingSession,
            "No analysis session to stream",
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Application, message)
    }

    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Incomplete, message)
    }
}

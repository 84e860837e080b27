//! Core Error Types
//!
//! Defines the foundational error types used across the LeaseLens workspace.
//! These error types are dependency-free (only thiserror + std) to keep the core
//! crate lightweight.
//!
//! The main application crate extends these with additional error variants
//! (e.g., Http, SessionNotFound) that require heavier dependencies.

use thiserror::Error;

/// Core error type for the LeaseLens workspace.
///
/// This is the minimal error set that the core crate needs. The application
/// crate defines additional variants for network, storage, etc.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Parse errors (malformed event lines, bad payload shapes)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal state-machine transitions
    #[error("Illegal transition: {from} -> {to}")]
    Transition { from: String, to: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a transition error
    pub fn transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Transition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod request;
pub mod session;

pub use request::*;
pub use session::*;

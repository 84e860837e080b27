//! Storage Layer
//!
//! Client-side persistence. Deliberately tiny: one JSON preferences file;
//! session data itself lives on the service and is restored over HTTP.

pub mod prefs;

pub use prefs::*;

//! Integration Tests Module
//!
//! End-to-end tests for the LeaseLens client: API round trips, stream
//! consumption, session restore, and the card edit flow, all driven against
//! scripted loopback HTTP servers.

mod support;

// API client request/response round trips and error mapping
mod api_test;

// Full open-and-consume stream path
mod stream_test;

// Restore-on-launch scenarios
mod session_restore_test;

// Propose/review/confirm edit flow and custom-card creation
mod edit_flow_test;

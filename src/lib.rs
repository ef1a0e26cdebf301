//! Join kanban board library
//!
//! This module exports the core components for testing and integration.

pub mod auth;
pub mod board;
pub mod cli;
pub mod config;
pub mod contacts;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod remote;
pub mod render;
pub mod session;
pub mod store;
pub mod summary;
pub mod types;

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

//! Shared helpers for integration tests.
//!
//! - `fixtures`: chat-completion response builders and project map files
//! - `logger`: per-test phase logging

pub mod fixtures;
pub mod logger;

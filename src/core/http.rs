//! HTTP client utilities.
//!
//! Provides the configured `reqwest` client used by the completion backend.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::error::{DiaryError, Result};

/// Default timeout for completion requests. Long prompts take a while.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("dir-diary/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DiaryError::Network(e.to_string()))
}

/// Map a transport-level `reqwest` failure to a [`DiaryError`].
#[must_use]
pub fn map_send_error(err: &reqwest::Error, timeout: Duration) -> DiaryError {
    if err.is_timeout() {
        DiaryError::Timeout(timeout.as_secs())
    } else if err.is_connect() {
        DiaryError::Network(format!("connection failed: {err}"))
    } else {
        DiaryError::Network(err.to_string())
    }
}

/// Parse a `Retry-After` header given in seconds.
#[must_use]
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

//! OpenAI-compatible chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::backend::{ChatBackend, ChatRequest, ChatResponse};
use super::http::{build_client, map_send_error, parse_retry_after};
use crate::error::{DiaryError, Result};

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const COMPLETIONS_PATH: &str = "/chat/completions";

/// Provider error code for prompts that overflow the context window.
const CONTEXT_LENGTH_CODE: &str = "context_length_exceeded";

/// Backend talking to `{api_base}/chat/completions` with bearer auth.
pub struct OpenAiBackend {
    client: Client,
    api_key: SecretString,
    url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiBackend {
    /// Create a backend for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, api_base: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            url: format!("{}{}", api_base.trim_end_matches('/'), COMPLETIONS_PATH),
            timeout,
        })
    }

    /// Full endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Error envelope returned by OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Whether an error message describes a context-window overflow.
fn mentions_context_length(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("maximum context length")
        || lower.contains("context length")
        || lower.contains("context window")
}

/// Classify a non-success response into a [`DiaryError`].
pub(crate) fn classify_failure(
    status: StatusCode,
    body: &str,
    model: &str,
    retry_after: Option<Duration>,
) -> DiaryError {
    let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);
    let message = detail
        .as_ref()
        .map(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let code = detail
        .as_ref()
        .and_then(|d| d.code.as_ref())
        .and_then(|c| c.as_str())
        .unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DiaryError::AuthRejected {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => DiaryError::RateLimited {
            retry_after,
            message,
        },
        s if (s == StatusCode::BAD_REQUEST || s == StatusCode::PAYLOAD_TOO_LARGE)
            && (code == CONTEXT_LENGTH_CODE || mentions_context_length(&message)) =>
        {
            DiaryError::ContextLengthExceeded {
                model: model.to_string(),
                message,
            }
        }
        _ => DiaryError::ProviderApi {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(
            model = %request.model,
            structured = request.tools.is_some(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| map_send_error(&e, self.timeout))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| map_send_error(&e, self.timeout))?;

        if !status.is_success() {
            let err = classify_failure(status, &body, &request.model, retry_after);
            tracing::debug!(status = status.as_u16(), error = %err, "Completion request failed");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            DiaryError::ParseResponse(format!("{e}; body: {}", truncate(&body, 512)))
        })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_length_code_is_detected() {
        let body = r#"{"error": {"message": "This model's maximum context length is 4097 tokens.", "type": "invalid_request_error", "param": "messages", "code": "context_length_exceeded"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, "gpt-3.5-turbo", None);
        match err {
            DiaryError::ContextLengthExceeded { model, message } => {
                assert_eq!(model, "gpt-3.5-turbo");
                assert!(message.contains("4097"));
            }
            other => panic!("expected context length error, got {other:?}"),
        }
    }

    #[test]
    fn context_length_message_without_code_is_detected() {
        let body = r#"{"error": {"message": "Input exceeds the context window of this model", "code": null}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, "m", None);
        assert!(err.is_context_length_exceeded());
    }

    #[test]
    fn other_bad_requests_are_not_context_errors() {
        let body = r#"{"error": {"message": "Invalid schema for function", "code": "invalid_function_parameters"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, "m", None);
        assert!(matches!(err, DiaryError::ProviderApi { status: 400, .. }));
    }

    #[test]
    fn auth_and_rate_limit_statuses() {
        let auth = classify_failure(StatusCode::UNAUTHORIZED, "Unauthorized", "m", None);
        assert!(matches!(auth, DiaryError::AuthRejected { status: 401, ref message } if message == "Unauthorized"));

        let limited = classify_failure(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"message": "Rate limit reached"}}"#,
            "m",
            Some(Duration::from_secs(3)),
        );
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn server_errors_keep_raw_body() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "upstream down", "m", None);
        assert!(matches!(err, DiaryError::ProviderApi { status: 502, ref message } if message == "upstream down"));
    }

    #[test]
    fn url_joins_base_and_path() {
        let backend = OpenAiBackend::new(
            SecretString::from("sk-test".to_string()),
            "http://localhost:8080/v1/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(backend.url(), "http://localhost:8080/v1/chat/completions");
        assert!(!format!("{backend:?}").contains("sk-test"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}

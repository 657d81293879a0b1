//! Error rendering.
//!
//! Human mode prints `Error [CODE]: message` plus an optional hint line;
//! JSON mode prints a structured object so scripts can branch on the code.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::DiaryError;

/// Render an error for stderr in the requested format.
#[must_use]
pub fn render_error(error: &DiaryError, format: OutputFormat, pretty: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Human => render_simple(error),
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &DiaryError, pretty: bool) -> String {
    let json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    rendered.unwrap_or_else(|_| render_simple(error))
}

fn render_simple(error: &DiaryError) -> String {
    let mut out = format!(
        "{} {}",
        format!("Error [{}]:", error.error_code()).red().bold(),
        error
    );
    if let Some(hint) = error.hint() {
        out.push_str(&format!("\n{} {hint}", "Hint:".yellow()));
    }
    out
}

/// JSON representation of an error.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    is_retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
    exit_code: u8,
}

impl ErrorJson {
    fn from_error(error: &DiaryError) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            retry_after_seconds: error.retry_after().map(|d| d.as_secs()),
            hint: error.hint(),
            exit_code: error.exit_code() as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::human::set_color_enabled;
    use serde_json::Value;
    use std::time::Duration;

    #[test]
    fn simple_render_includes_code_and_hint() {
        set_color_enabled(false);
        let out = render_error(&DiaryError::AuthNotConfigured, OutputFormat::Human, false);
        assert!(out.starts_with("Error [DIARY-A001]:"));
        assert!(out.contains("Hint: export OPENAI_API_KEY"));
    }

    #[test]
    fn json_render_is_structured() {
        let err = DiaryError::RateLimited {
            retry_after: Some(Duration::from_secs(12)),
            message: "slow down".to_string(),
        };
        let out = render_error(&err, OutputFormat::Json, false);
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["errorCode"], "DIARY-P001");
        assert_eq!(value["isRetryable"], true);
        assert_eq!(value["retryAfterSeconds"], 12);
        assert_eq!(value["exitCode"], 1);
    }

    #[test]
    fn json_omits_absent_fields() {
        let out = render_error_json(&DiaryError::MissingContent, false);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("hint").is_none());
        assert!(value.get("retryAfterSeconds").is_none());
    }
}

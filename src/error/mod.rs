//! Error types for dir-diary.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are grouped into six categories:
//! - **Authentication**: missing or rejected API keys
//! - **Network**: connection failures and timeouts
//! - **Configuration**: config file, price table, or unknown model problems
//! - **Provider**: errors reported by the completion API, including
//!   context-length overflows and rate limits
//! - **Validation**: model output that does not match the expected shape
//! - **Internal**: I/O, JSON, and unclassified failures
//!
//! Each error has a stable error code (e.g., `DIARY-P002`) for programmatic handling.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// API key missing or rejected.
    Authentication,
    /// Timeout, DNS, or connection issues.
    Network,
    /// Config file, price table, or model identifier problems.
    Configuration,
    /// The completion API reported an error.
    Provider,
    /// The model answered, but not in the expected shape.
    Validation,
    /// Bugs, I/O, and unclassified errors.
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Provider => "Provider error",
            Self::Validation => "Validation error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Provider => "P",
            Self::Validation => "V",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Remote or unexpected failure
    GeneralError = 1,
    /// Parse, validation, or configuration errors
    ParseError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

// =============================================================================
// Classification validation errors
// =============================================================================

/// A structured classification response failed validation.
///
/// Kept separate from transport failures: the request succeeded and was
/// billed, but the payload cannot be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The response carried no function call at all.
    #[error("response contains no function call")]
    MissingFunctionCall,

    /// The function call named a different function.
    #[error("unexpected function call '{found}', expected '{expected}'")]
    UnexpectedFunction { expected: String, found: String },

    /// Function arguments were not valid JSON.
    #[error("function arguments are not valid JSON: {0}")]
    MalformedArguments(String),

    /// A required field was absent from the arguments.
    #[error("function arguments missing required field '{0}'")]
    MissingField(String),

    /// A file was given no role, a null role, or a role outside the taxonomy.
    #[error("invalid role {role:?} for '{path}'")]
    InvalidRole { path: String, role: Option<String> },

    /// An input file was not classified and had no prior role to fall back on.
    #[error("no role assigned to '{0}'")]
    MissingPath(String),
}

// =============================================================================
// Main error type
// =============================================================================

/// Main error type for dir-diary operations.
///
/// Each variant has:
/// - A stable error code (e.g., `DIARY-P002`)
/// - A category for classification
/// - An exit code for the CLI
#[derive(Error, Debug)]
pub enum DiaryError {
    // ==========================================================================
    // Authentication errors
    // ==========================================================================
    /// No API key was supplied by flag, environment, or config file.
    #[error("API key not configured (set OPENAI_API_KEY or llm.api_key)")]
    AuthNotConfigured,

    /// The provider rejected the API key.
    #[error("authentication rejected by provider (HTTP {status}): {message}")]
    AuthRejected { status: u16, message: String },

    // ==========================================================================
    // Network errors
    // ==========================================================================
    /// Request timed out.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error parsing a configuration or price file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Model identifier absent from the price table.
    #[error("model '{0}' not found in price table")]
    UnknownModel(String),

    // ==========================================================================
    // Provider errors
    // ==========================================================================
    /// The prompt did not fit in the model's context window.
    #[error("context length exceeded for model {model}: {message}")]
    ContextLengthExceeded { model: String, message: String },

    /// Rate limited by the provider.
    #[error("rate limited: {message}")]
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },

    /// Any other non-success response from the provider.
    #[error("provider API error (HTTP {status}): {message}")]
    ProviderApi { status: u16, message: String },

    /// Response body could not be parsed.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    /// Response carried no text content where text was expected.
    #[error("response contains no message content")]
    MissingContent,

    // ==========================================================================
    // Validation errors
    // ==========================================================================
    /// Structured classification output failed validation.
    #[error("classification validation failed: {0}")]
    Classification(#[from] ClassificationError),

    // ==========================================================================
    // Internal errors
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DiaryError {
    /// Map error to a process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_)
            | Self::ConfigParse { .. }
            | Self::UnknownModel(_)
            | Self::AuthNotConfigured
            | Self::ParseResponse(_)
            | Self::MissingContent
            | Self::Classification(_) => ExitCode::ParseError,

            Self::Timeout(_) => ExitCode::Timeout,

            Self::AuthRejected { .. }
            | Self::Network(_)
            | Self::ContextLengthExceeded { .. }
            | Self::RateLimited { .. }
            | Self::ProviderApi { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthNotConfigured | Self::AuthRejected { .. } => ErrorCategory::Authentication,

            Self::Timeout(_) | Self::Network(_) => ErrorCategory::Network,

            Self::Config(_) | Self::ConfigParse { .. } | Self::UnknownModel(_) => {
                ErrorCategory::Configuration
            }

            Self::ContextLengthExceeded { .. }
            | Self::RateLimited { .. }
            | Self::ProviderApi { .. }
            | Self::ParseResponse(_)
            | Self::MissingContent => ErrorCategory::Provider,

            Self::Classification(_) => ErrorCategory::Validation,

            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `DIARY-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AuthNotConfigured => "DIARY-A001",
            Self::AuthRejected { .. } => "DIARY-A002",

            Self::Timeout(_) => "DIARY-N001",
            Self::Network(_) => "DIARY-N099",

            Self::Config(_) => "DIARY-C001",
            Self::ConfigParse { .. } => "DIARY-C002",
            Self::UnknownModel(_) => "DIARY-C010",

            Self::RateLimited { .. } => "DIARY-P001",
            Self::ContextLengthExceeded { .. } => "DIARY-P002",
            Self::ProviderApi { .. } => "DIARY-P003",
            Self::ParseResponse(_) => "DIARY-P020",
            Self::MissingContent => "DIARY-P021",

            Self::Classification(_) => "DIARY-V001",

            Self::Io(_) => "DIARY-X001",
            Self::Json(_) => "DIARY-X002",
            Self::Other(_) => "DIARY-X099",
        }
    }

    /// Whether the failure is the provider reporting a context-window overflow.
    #[must_use]
    pub const fn is_context_length_exceeded(&self) -> bool {
        matches!(self, Self::ContextLengthExceeded { .. })
    }

    /// Returns the retry-after duration if this error specifies one.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether retrying the same command later might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Network(_) | Self::RateLimited { .. }
        ) || matches!(self, Self::ProviderApi { status, .. } if *status >= 500)
    }

    /// One-line remediation hint for the user, if there is a useful one.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AuthNotConfigured => {
                Some("export OPENAI_API_KEY=sk-... (or set llm.api_key in config.toml)")
            }
            Self::AuthRejected { .. } => Some("check that OPENAI_API_KEY is valid and not revoked"),
            Self::Timeout(_) => Some("raise DIARY_TIMEOUT or llm.timeout_seconds (max 600)"),
            Self::Network(_) => Some("check connectivity and DIARY_API_BASE"),
            Self::UnknownModel(_) => {
                Some("run `dir-diary models` to list priced models, or pass --pricing <file>")
            }
            Self::ContextLengthExceeded { .. } => {
                Some("configure a long-context model with --fallback-model")
            }
            Self::RateLimited { .. } => Some("wait and retry, or lower request volume"),
            Self::Config(_) | Self::ConfigParse { .. } => {
                Some("fix the config file or unset DIARY_CONFIG to use defaults")
            }
            Self::Classification(_) => Some("retry; the model returned an unusable classification"),
            _ => None,
        }
    }
}

/// Result type alias using [`DiaryError`].
pub type Result<T> = std::result::Result<T, DiaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_carry_category_prefix() {
        let cases = [
            DiaryError::AuthNotConfigured,
            DiaryError::Timeout(30),
            DiaryError::UnknownModel("x".to_string()),
            DiaryError::ContextLengthExceeded {
                model: "gpt-4".to_string(),
                message: "too long".to_string(),
            },
            DiaryError::Classification(ClassificationError::MissingFunctionCall),
            DiaryError::Other(anyhow::anyhow!("boom")),
        ];

        for err in cases {
            let expected = format!("DIARY-{}", err.category().code_prefix());
            assert!(
                err.error_code().starts_with(&expected),
                "{} should start with {expected}",
                err.error_code()
            );
        }
    }

    #[test]
    fn validation_failures_are_distinct_from_transport() {
        let validation = DiaryError::from(ClassificationError::MissingField("files".to_string()));
        let transport = DiaryError::Network("connection reset".to_string());

        assert_eq!(validation.category(), ErrorCategory::Validation);
        assert_eq!(transport.category(), ErrorCategory::Network);
        assert_eq!(validation.exit_code(), ExitCode::ParseError);
        assert_eq!(transport.exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn context_length_is_detectable() {
        let err = DiaryError::ContextLengthExceeded {
            model: "gpt-3.5-turbo".to_string(),
            message: "maximum context length is 4097 tokens".to_string(),
        };
        assert!(err.is_context_length_exceeded());
        assert!(!DiaryError::Timeout(5).is_context_length_exceeded());
    }

    #[test]
    fn retry_after_only_on_rate_limit() {
        let err = DiaryError::RateLimited {
            retry_after: Some(Duration::from_secs(20)),
            message: "slow down".to_string(),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(20)));
        assert_eq!(DiaryError::MissingContent.retry_after(), None);
    }

    #[test]
    fn unknown_model_message_names_model() {
        let err = DiaryError::UnknownModel("gpt-9".to_string());
        assert!(err.to_string().contains("gpt-9"));
        assert_eq!(err.exit_code(), ExitCode::ParseError);
    }

    #[test]
    fn retryable_errors() {
        assert!(DiaryError::Timeout(30).is_retryable());
        assert!(DiaryError::ProviderApi {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_retryable());
        assert!(!DiaryError::ProviderApi {
            status: 400,
            message: "bad".to_string()
        }
        .is_retryable());
        assert!(!DiaryError::AuthNotConfigured.is_retryable());
    }

    #[test]
    fn missing_key_hint_names_the_env_var() {
        let hint = DiaryError::AuthNotConfigured.hint().unwrap();
        assert!(hint.contains("OPENAI_API_KEY"));
        assert!(DiaryError::MissingContent.hint().is_none());
    }
}

//! Configuration file loading and resolution.
//!
//! Loads configuration from:
//! - Linux: `~/.config/dir_diary/config.toml`
//! - macOS: `~/Library/Application Support/dir_diary/config.toml`
//! - Windows: `%APPDATA%/dir_diary/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `OPENAI_API_KEY`: API key
//! - `DIARY_MODEL`: Primary model identifier
//! - `DIARY_FALLBACK_MODEL`: Long-context fallback model (`none` disables it)
//! - `DIARY_API_BASE`: API base URL
//! - `DIARY_TIMEOUT`: Request timeout in seconds
//! - `DIARY_CONFIG`: Override config file path

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use super::AppPaths;
use crate::cli::args::Cli;
use crate::core::openai::DEFAULT_API_BASE;
use crate::error::{DiaryError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable for the primary model.
pub const ENV_MODEL: &str = "DIARY_MODEL";
/// Environment variable for the long-context fallback model.
pub const ENV_FALLBACK_MODEL: &str = "DIARY_FALLBACK_MODEL";
/// Environment variable for the API base URL.
pub const ENV_API_BASE: &str = "DIARY_API_BASE";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "DIARY_TIMEOUT";
/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "DIARY_CONFIG";

/// Default primary model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Default long-context fallback model.
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-3.5-turbo-16k";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const MAX_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved client settings after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// API key. `None` is only an error once a request is needed.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub long_context_fallback: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
    /// Replacement price table, if any.
    pub pricing_file: Option<PathBuf>,
    /// Config file that was consulted.
    pub config_path: PathBuf,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub api_key: ConfigSource,
    pub model: ConfigSource,
    pub long_context_fallback: ConfigSource,
    pub api_base: ConfigSource,
    pub timeout: ConfigSource,
    pub pricing_file: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Pick the first present value, recording where it came from.
fn pick<T>(
    cli: Option<T>,
    env: Option<T>,
    file: Option<T>,
    source: &mut ConfigSource,
) -> Option<T> {
    if cli.is_some() {
        *source = ConfigSource::Cli;
        cli
    } else if env.is_some() {
        *source = ConfigSource::Env;
        env
    } else if file.is_some() {
        *source = ConfigSource::ConfigFile;
        file
    } else {
        *source = ConfigSource::Default;
        None
    }
}

/// Whether a fallback value means "no fallback".
fn disables_fallback(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "" | "none" | "off")
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid, or if any
    /// resolved value is invalid.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config_path = Self::config_path(cli);
        let config = Config::load_from(&config_path)?;
        Self::resolve_with(cli, &config, config_path, |key| std::env::var(key).ok())
    }

    /// Config file location: `--config`, then `DIARY_CONFIG`, then the platform default.
    fn config_path(cli: &Cli) -> PathBuf {
        cli.config
            .clone()
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from))
            .unwrap_or_else(Config::config_path)
    }

    /// Resolve against an explicit config and environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::Config`] if the merged values fail validation.
    pub fn resolve_with(
        cli: &Cli,
        config: &Config,
        config_path: PathBuf,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        config.validate()?;
        let env_value = |key: &str| env(key).map(|v| v.trim().to_string());
        let mut sources = ConfigSources::default();

        // No CLI flag for the key: it would end up in shell history.
        let api_key = pick(
            None,
            env_value(ENV_API_KEY)
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            config.llm.api_key.clone(),
            &mut sources.api_key,
        );

        let model = pick(
            cli.model.clone(),
            env_value(ENV_MODEL).filter(|v| !v.is_empty()),
            config.llm.model.clone(),
            &mut sources.model,
        )
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let fallback = pick(
            cli.fallback_model.clone(),
            env_value(ENV_FALLBACK_MODEL),
            config.llm.long_context_fallback.clone(),
            &mut sources.long_context_fallback,
        );
        let long_context_fallback = match fallback {
            Some(value) if disables_fallback(&value) => None,
            Some(value) => Some(value),
            // The built-in fallback only makes sense for a different primary.
            None if !model.eq_ignore_ascii_case(DEFAULT_FALLBACK_MODEL) => Some(DEFAULT_FALLBACK_MODEL.to_string()),
            None => None,
        };

        let api_base = pick(
            None,
            env_value(ENV_API_BASE).filter(|v| !v.is_empty()),
            config.llm.api_base.clone(),
            &mut sources.api_base,
        )
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout_env = match env_value(ENV_TIMEOUT) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                DiaryError::Config(format!("{ENV_TIMEOUT} must be a number of seconds, got '{raw}'"))
            })?),
            None => None,
        };
        let timeout_secs = pick(
            None,
            timeout_env,
            config.llm.timeout_seconds,
            &mut sources.timeout,
        )
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let pricing_file = pick(
            cli.pricing.clone(),
            None,
            config.pricing.file.clone(),
            &mut sources.pricing_file,
        );

        let resolved = Self {
            api_key,
            model,
            long_context_fallback,
            api_base,
            timeout: Duration::from_secs(timeout_secs),
            pricing_file,
            config_path,
            sources,
        };
        resolved.validate()?;

        tracing::debug!(
            model = %resolved.model,
            model_source = %resolved.sources.model,
            fallback = ?resolved.long_context_fallback,
            api_base = %resolved.api_base,
            timeout_secs,
            api_key_set = resolved.api_key.is_some(),
            "Resolved configuration"
        );

        Ok(resolved)
    }

    /// Validate the merged values.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(DiaryError::Config("Model must not be empty".to_string()));
        }
        validate_timeout(self.timeout.as_secs())?;
        if self
            .long_context_fallback
            .as_deref()
            .is_some_and(|fallback| fallback.eq_ignore_ascii_case(&self.model))
        {
            return Err(DiaryError::Config(format!(
                "Long-context fallback must differ from the primary model ('{}')",
                self.model
            )));
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(DiaryError::Config(format!(
                "API base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        Ok(())
    }
}

fn validate_timeout(seconds: u64) -> Result<()> {
    if seconds == 0 || seconds > MAX_TIMEOUT_SECS {
        return Err(DiaryError::Config(format!(
            "Timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
        )));
    }
    Ok(())
}

// =============================================================================
// Config file
// =============================================================================

/// Application configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model and endpoint settings.
    pub llm: LlmConfig,
    /// Price table settings.
    pub pricing: PricingConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub long_context_fallback: Option<String>,
    pub api_base: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Read-only; the key is never written anywhere by this crate.
    pub api_key: Option<SecretString>,
}

/// `[pricing]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// JSON price file replacing the built-in table.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DiaryError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Get the default config file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        AppPaths::new().config_file()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::Config`] for an empty model or an out-of-range timeout.
    pub fn validate(&self) -> Result<()> {
        if let Some(model) = &self.llm.model {
            if model.trim().is_empty() {
                return Err(DiaryError::Config(
                    "llm.model must not be empty".to_string(),
                ));
            }
        }
        if let Some(timeout) = self.llm.timeout_seconds {
            validate_timeout(timeout)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["dir-diary"];
        argv.extend_from_slice(args);
        argv.push("models");
        Cli::try_parse_from(argv).unwrap()
    }

    fn resolve(cli: &Cli, config: &Config, env: &[(&str, &str)]) -> Result<ResolvedConfig> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ResolvedConfig::resolve_with(cli, config, PathBuf::from("config.toml"), |key| {
            env.get(key).cloned()
        })
    }

    fn file_config() -> Config {
        toml::from_str(
            r#"
[llm]
model = "gpt-4"
long_context_fallback = "gpt-4-32k"
api_base = "http://localhost:9000/v1"
timeout_seconds = 90
api_key = "sk-from-file"

[pricing]
file = "/etc/dir_diary/prices.json"
"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let resolved = resolve(&cli(&[]), &Config::default(), &[]).unwrap();
        assert_eq!(resolved.model, DEFAULT_MODEL);
        assert_eq!(
            resolved.long_context_fallback.as_deref(),
            Some(DEFAULT_FALLBACK_MODEL)
        );
        assert_eq!(resolved.api_base, DEFAULT_API_BASE);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(resolved.api_key.is_none());
        assert_eq!(resolved.sources.model, ConfigSource::Default);
    }

    #[test]
    fn file_values_are_used() {
        let resolved = resolve(&cli(&[]), &file_config(), &[]).unwrap();
        assert_eq!(resolved.model, "gpt-4");
        assert_eq!(resolved.long_context_fallback.as_deref(), Some("gpt-4-32k"));
        assert_eq!(resolved.api_base, "http://localhost:9000/v1");
        assert_eq!(resolved.timeout, Duration::from_secs(90));
        assert_eq!(resolved.api_key.unwrap().expose_secret(), "sk-from-file");
        assert_eq!(
            resolved.pricing_file,
            Some(PathBuf::from("/etc/dir_diary/prices.json"))
        );
        assert_eq!(resolved.sources.timeout, ConfigSource::ConfigFile);
    }

    #[test]
    fn env_beats_file_and_cli_beats_env() {
        let env = [
            (ENV_MODEL, "gpt-4o"),
            (ENV_API_KEY, "sk-from-env"),
            (ENV_TIMEOUT, "15"),
        ];
        let resolved = resolve(&cli(&[]), &file_config(), &env).unwrap();
        assert_eq!(resolved.model, "gpt-4o");
        assert_eq!(resolved.sources.model, ConfigSource::Env);
        assert_eq!(resolved.api_key.unwrap().expose_secret(), "sk-from-env");
        assert_eq!(resolved.timeout, Duration::from_secs(15));

        let resolved = resolve(&cli(&["--model", "gpt-4-turbo"]), &file_config(), &env).unwrap();
        assert_eq!(resolved.model, "gpt-4-turbo");
        assert_eq!(resolved.sources.model, ConfigSource::Cli);
    }

    #[test]
    fn fallback_can_be_disabled() {
        let resolved = resolve(&cli(&["--fallback-model", "none"]), &file_config(), &[]).unwrap();
        assert!(resolved.long_context_fallback.is_none());

        let resolved = resolve(&cli(&[]), &Config::default(), &[(ENV_FALLBACK_MODEL, "")]).unwrap();
        assert!(resolved.long_context_fallback.is_none());
    }

    #[test]
    fn default_fallback_is_skipped_when_it_is_the_primary() {
        let resolved =
            resolve(&cli(&["--model", DEFAULT_FALLBACK_MODEL]), &Config::default(), &[]).unwrap();
        assert!(resolved.long_context_fallback.is_none());
    }

    #[test]
    fn default_fallback_skip_ignores_case() {
        let resolved =
            resolve(&cli(&["--model", "GPT-3.5-Turbo-16k"]), &Config::default(), &[]).unwrap();
        assert_eq!(resolved.model, "GPT-3.5-Turbo-16k");
        assert!(resolved.long_context_fallback.is_none());
    }

    #[test]
    fn fallback_equal_to_primary_in_other_case_is_rejected() {
        let err = resolve(
            &cli(&["--model", "gpt-4", "--fallback-model", "GPT-4"]),
            &Config::default(),
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn explicit_fallback_equal_to_primary_is_rejected() {
        let err = resolve(
            &cli(&["--model", "gpt-4", "--fallback-model", "gpt-4"]),
            &Config::default(),
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn bad_timeouts_are_rejected() {
        let err = resolve(&cli(&[]), &Config::default(), &[(ENV_TIMEOUT, "abc")]).unwrap_err();
        assert!(matches!(err, DiaryError::Config(_)));

        let err = resolve(&cli(&[]), &Config::default(), &[(ENV_TIMEOUT, "0")]).unwrap_err();
        assert!(err.to_string().contains("between 1 and 600"));

        let mut config = Config::default();
        config.llm.timeout_seconds = Some(601);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_model_in_file_is_rejected() {
        let mut config = Config::default();
        config.llm.model = Some("  ".to_string());
        assert!(resolve(&cli(&[]), &config, &[]).is_err());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let config = Config::load_from(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert!(config.llm.model.is_none());
    }

    #[test]
    fn load_invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, DiaryError::ConfigParse { .. }));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let resolved = resolve(&cli(&[]), &file_config(), &[]).unwrap();
        assert!(!format!("{resolved:?}").contains("sk-from-file"));
    }
}

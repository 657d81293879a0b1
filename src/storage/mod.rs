//! Configuration storage.

pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, ENV_API_BASE, ENV_API_KEY, ENV_CONFIG,
    ENV_FALLBACK_MODEL, ENV_MODEL, ENV_TIMEOUT, LlmConfig, PricingConfig, ResolvedConfig,
};
pub use paths::AppPaths;

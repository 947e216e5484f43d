//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then `planwatch.toml`
//! (or an explicit file), then `PLANWATCH__SECTION__KEY` environment
//! variables.

use std::path::Path;
use std::sync::Arc;

use application::QueryCacheConfig;
use backend_api::{ApiConfig, CredentialStore, Credentials, SharedCredentials};
use doc_intel::AnalysisConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryConfig;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "planwatch";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PLANWATCH";

const ENV_SEPARATOR: &str = "__";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend REST API
    #[serde(default)]
    pub backend: ApiConfig,

    /// Document-intelligence streaming service
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Credentials issued by the identity provider
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Query cache
    #[serde(default)]
    pub cache: QueryCacheConfig,

    /// Backoff for idempotent backend reads
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial credentials
///
/// Usually supplied through `PLANWATCH__CREDENTIALS__TOKEN` rather than a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,

    #[serde(default)]
    pub user_id: Option<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when neither `-v` nor `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, a config file and the environment
    ///
    /// Without `path`, `planwatch.toml` in the working directory is used if it
    /// exists. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, environment())
    }

    fn load_from(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values the backend clients cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("backend.base_url", &self.backend.base_url)?;
        validate_url("analysis.base_url", &self.analysis.base_url)?;

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.backend.connect_timeout_secs == 0 || self.analysis.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.analysis.completion_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "analysis.completion_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.analysis.max_documents == 0 {
            return Err(ConfigError::Invalid(
                "analysis.max_documents must be greater than zero".to_string(),
            ));
        }
        if self.analysis.max_line_bytes == 0 {
            return Err(ConfigError::Invalid(
                "analysis.max_line_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Credential store seeded from the `credentials` section
    #[must_use]
    pub fn credential_store(&self) -> SharedCredentials {
        Arc::new(CredentialStore::new(Credentials::new(
            self.credentials.token.clone(),
            self.credentials.user_id.clone(),
        )))
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be an http(s) URL, got '{url}'"
        )));
    }
    Ok(())
}

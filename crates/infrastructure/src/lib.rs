//! Infrastructure layer - configuration, logging and backend adapters
//!
//! Implements the application ports on top of `backend_api` and wires all
//! clients from one configuration.

pub mod adapters;
pub mod config;
pub mod context;
pub mod retry;
pub mod telemetry;

pub use adapters::BackendAdapter;
pub use config::{
    AppConfig, ConfigError, CredentialsConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX, LogFormat,
    LoggingConfig,
};
pub use context::{AppContext, ContextError};
pub use retry::{RetryConfig, Retryable, retry};
pub use telemetry::{TelemetryError, init_logging, level_from_verbosity};

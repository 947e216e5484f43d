//! Logging initialisation
//!
//! Logs go to stderr so `--json` output on stdout stays machine readable.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to initialise logging: {0}")]
    Init(String),
}

/// Filter directive for a `-v` count
///
/// Returns `None` for zero so the caller falls back to `RUST_LOG` or config.
pub const fn level_from_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Resolve the filter: `-v` flags, then `RUST_LOG`, then `logging.level`
fn env_filter(config: &LoggingConfig, verbosity: u8) -> EnvFilter {
    if let Some(level) = level_from_verbosity(verbosity) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) -> Result<(), TelemetryError> {
    let filter = env_filter(config, verbosity);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(|e| TelemetryError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_from_verbosity(0), None);
        assert_eq!(level_from_verbosity(1), Some("info"));
        assert_eq!(level_from_verbosity(2), Some("debug"));
        assert_eq!(level_from_verbosity(3), Some("trace"));
        assert_eq!(level_from_verbosity(9), Some("trace"));
    }

    #[test]
    fn verbosity_overrides_config_level() {
        let config = LoggingConfig {
            level: "error".to_string(),
            format: LogFormat::Pretty,
        };
        assert_eq!(env_filter(&config, 2).to_string(), "debug");
    }

    #[test]
    fn second_init_fails() {
        let config = LoggingConfig::default();
        let first = init_logging(&config, 0);
        let second = init_logging(&config, 0);
        assert!(first.is_ok());
        assert!(matches!(second, Err(TelemetryError::Init(_))));
    }
}

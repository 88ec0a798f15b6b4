//! Process-wide tracing setup for the screening tools.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log level '{value}' is not a valid tracing filter")]
    LogLevel {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("a tracing subscriber is already installed")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber on stderr, keeping stdout free for reports.
/// `RUST_LOG` wins over the configured level when it parses.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn level_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::LogLevel {
        value: log_level.to_string(),
        source,
    })
}

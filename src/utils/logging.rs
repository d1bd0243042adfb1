//! Logging setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the configured level.

use crate::config::{LogFormat, LoggingConfig};
use crate::utils::error::{GatewayError, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter used by the subscriber
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            GatewayError::Config(format!("Invalid log level '{}': {}", config.level, e))
        }),
    }
}

/// Initialize the global subscriber
///
/// Fails if the level directive is malformed or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .try_init(),
    };

    installed.map_err(|e| GatewayError::Internal(format!("Failed to initialize logging: {}", e)))
}

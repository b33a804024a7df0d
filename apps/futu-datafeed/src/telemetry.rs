//! Tracing Setup
//!
//! Console logging through `tracing-subscriber`, pretty or JSON.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives, overriding the config file
//! - `observability.logging.level`: default level for this crate
//! - `observability.logging.format`: `pretty` or `json`
//!
//! # Usage
//!
//! ```rust,ignore
//! use futu_datafeed::telemetry::init_tracing;
//!
//! init_tracing(&config.observability.logging)?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Tracing initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Default filter for a configured level.
#[must_use]
pub fn default_directive(level: &str) -> String {
    format!("futu_datafeed={}", level.trim().to_ascii_lowercase())
}

/// Build the filter: `RUST_LOG` when set, otherwise the configured level.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::Init` if a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config);

    let result = if config.is_json() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    result.map_err(|e| TelemetryError::Init(e.to_string()))
}

//! Crate-level error type for the binary's startup and output path.

use thiserror::Error;

use crate::cli::CliError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// Errors that end a `futu-datafeed` run.
#[derive(Debug, Error)]
pub enum DatafeedError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tracing could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Command-line arguments were invalid.
    #[error("{0}")]
    Arguments(#[from] CliError),

    /// `init` reported failure through the output sink.
    #[error("Futu datafeed initialization failed for {address}:{port}")]
    NotInitialized {
        /// OpenD host.
        address: String,
        /// OpenD port.
        port: u16,
    },

    /// Writing bars to stdout failed.
    #[error("Failed to write bars: {0}")]
    Output(#[from] std::io::Error),

    /// Serializing a bar failed.
    #[error("Failed to serialize bar: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_cli_errors() {
        let err = DatafeedError::from(CliError::ArgumentCount(1));
        assert_eq!(err.to_string(), "expected 5 arguments, got 1");
    }

    #[test]
    fn not_initialized_names_endpoint() {
        let err = DatafeedError::NotInitialized {
            address: "127.0.0.1".to_string(),
            port: 11111,
        };
        assert!(err.to_string().contains("127.0.0.1:11111"));
    }
}

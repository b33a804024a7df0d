//! Configuration module for the Futu datafeed.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before use.
//!
//! # Usage
//!
//! ```rust,ignore
//! use futu_datafeed::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//! println!("OpenD at {}:{}", config.futu.address, config.futu.port);
//! ```

mod futu;
mod observability;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use futu::{FutuSettings, OpenDSettings};
pub use observability::{LoggingConfig, ObservabilityConfig};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FUTU_CONFIG_PATH";

/// Config file used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Largest page size OpenD accepts.
pub const MAX_ACK_KL_NUM_LIMIT: i32 = 1000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenD connection settings. `address` and `port` are required.
    pub futu: FutuSettings,
    /// OpenD client tuning.
    #[serde(default)]
    pub opend: OpenDSettings,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// `path` defaults to `$FUTU_CONFIG_PATH`, then `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is a compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.futu.address.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "futu.address must not be empty".to_string(),
        ));
    }

    if config.futu.port == 0 {
        return Err(ConfigError::ValidationError(
            "futu.port must be non-zero".to_string(),
        ));
    }

    if config.opend.request_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "opend.request_timeout_ms must be positive".to_string(),
        ));
    }

    if !(1..=MAX_ACK_KL_NUM_LIMIT).contains(&config.opend.max_ack_kl_num) {
        return Err(ConfigError::ValidationError(format!(
            "opend.max_ack_kl_num must be between 1 and {MAX_ACK_KL_NUM_LIMIT}"
        )));
    }

    let valid_formats = ["pretty", "json"];
    let format = config.observability.logging.format.to_ascii_lowercase();
    if !valid_formats.contains(&format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;
    use crate::infrastructure::opend::RehabType;

    const MINIMAL: &str = "futu:\n  address: 127.0.0.1\n  port: 11111\n";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = match load_config_from_string(MINIMAL) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };

        assert_eq!(config.futu.address, "127.0.0.1");
        assert_eq!(config.futu.port, 11111);
        assert!(!config.futu.is_encrypted);
        assert_eq!(config.futu.install_dir, None);
        assert_eq!(config.opend.request_timeout_ms, 10_000);
        assert_eq!(config.opend.max_ack_kl_num, 1000);
        assert_eq!(config.opend.rehab_type, RehabType::Forward);
        assert_eq!(config.observability.logging.format, "pretty");
    }

    #[test]
    fn test_empty_config_is_rejected() {
        let Err(err) = load_config_from_string("{}") else {
            panic!("expected error for missing futu section");
        };
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_port_is_rejected() {
        let Err(err) = load_config_from_string("futu:\n  address: 127.0.0.1\n") else {
            panic!("expected error for missing port");
        };
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
futu:
  address: "10.0.0.5"
  port: 22222
  is_encrypted: true
  install_dir: /opt/futu
opend:
  client_id: research
  request_timeout_ms: 2500
  max_ack_kl_num: 500
  rehab_type: none
observability:
  logging:
    level: debug
    format: json
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.futu.address, "10.0.0.5");
        assert_eq!(config.futu.port, 22222);
        assert!(config.futu.is_encrypted);
        assert_eq!(config.futu.install_dir, Some(PathBuf::from("/opt/futu")));
        assert_eq!(config.opend.client_id, "research");
        assert_eq!(config.opend.max_ack_kl_num, 500);
        assert_eq!(config.opend.rehab_type, RehabType::None);
        assert!(config.observability.logging.is_json());

        let client = config.opend.client_config();
        assert_eq!(client.request_timeout.as_millis(), 2500);
        assert_eq!(client.max_ack_kl_num, 500);
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "address: ${FUTU_CONFIG_TEST_NONEXISTENT_VAR:-127.0.0.1}";
        assert_eq!(interpolate_env_vars(input), "address: 127.0.0.1");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "address: ${FUTU_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "address: ");
    }

    #[test]
    fn test_validation_empty_address() {
        let yaml = r#"
futu:
  address: ""
  port: 11111
"#;
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for empty address");
        };
        assert!(err.to_string().contains("futu.address"));
    }

    #[test]
    fn test_validation_zero_port() {
        let yaml = "futu:\n  address: 127.0.0.1\n  port: 0\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero port");
        };
        assert!(err.to_string().contains("futu.port"));
    }

    #[test]
    fn test_validation_page_size_out_of_range() {
        let yaml = format!("{MINIMAL}opend:\n  max_ack_kl_num: 5000\n");
        let Err(err) = load_config_from_string(&yaml) else {
            panic!("expected error for oversized page");
        };
        assert!(err.to_string().contains("max_ack_kl_num"));
    }

    #[test]
    fn test_validation_unknown_log_format() {
        let yaml = format!("{MINIMAL}observability:\n  logging:\n    format: xml\n");
        let Err(err) = load_config_from_string(&yaml) else {
            panic!("expected error for unknown format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"futu:\n  address: 127.0.0.1\n  port: 11112\n").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.futu.port, 11112);
    }

    #[test]
    fn test_load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/futu-config.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}

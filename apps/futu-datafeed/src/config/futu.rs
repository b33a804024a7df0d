//! OpenD connection settings.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::opend::{OpenDConfig, RehabType};

/// Where and how to reach OpenD.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutuSettings {
    /// OpenD host. Required.
    pub address: String,
    /// OpenD port. Required.
    pub port: u16,
    /// Enable protocol encryption with the RSA key under the install dir.
    #[serde(default)]
    pub is_encrypted: bool,
    /// Override for the directory holding `rsa_key/`.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
}

impl fmt::Debug for FutuSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutuSettings")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("is_encrypted", &self.is_encrypted)
            .finish_non_exhaustive()
    }
}

impl FutuSettings {
    /// Settings for a plaintext connection to `address:port`.
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            is_encrypted: false,
            install_dir: None,
        }
    }
}

/// OpenD client tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDSettings {
    /// Identifier sent in the handshake.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Time allowed for each reply, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Page size per kline request.
    #[serde(default = "default_max_ack_kl_num")]
    pub max_ack_kl_num: i32,
    /// Price adjustment.
    #[serde(default)]
    pub rehab_type: RehabType,
}

impl Default for OpenDSettings {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            request_timeout_ms: default_request_timeout_ms(),
            max_ack_kl_num: default_max_ack_kl_num(),
            rehab_type: RehabType::default(),
        }
    }
}

impl OpenDSettings {
    /// Client configuration for these settings.
    #[must_use]
    pub fn client_config(&self) -> OpenDConfig {
        OpenDConfig::new(self.client_id.clone())
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_max_ack_kl_num(self.max_ack_kl_num)
            .with_rehab_type(self.rehab_type)
    }
}

fn default_client_id() -> String {
    "futu-datafeed".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_max_ack_kl_num() -> i32 {
    1000
}

//! Configuration for the OpenD client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Price adjustment applied to historical klines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RehabType {
    /// Raw prices.
    None,
    /// Forward-adjusted prices.
    #[default]
    Forward,
    /// Backward-adjusted prices.
    Backward,
}

impl RehabType {
    /// Wire value.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Forward => 1,
            Self::Backward => 2,
        }
    }
}

/// Client-side settings for OpenD sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDConfig {
    /// Identifier sent in the handshake.
    pub client_id: String,

    /// Version number sent in the handshake.
    pub client_ver: i32,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// Time allowed for each reply.
    pub request_timeout: Duration,

    /// Page size requested per kline call.
    pub max_ack_kl_num: i32,

    /// Price adjustment.
    pub rehab_type: RehabType,
}

impl Default for OpenDConfig {
    fn default() -> Self {
        Self {
            client_id: "futu-datafeed".to_string(),
            client_ver: 100,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_ack_kl_num: 1000,
            rehab_type: RehabType::Forward,
        }
    }
}

impl OpenDConfig {
    /// Create a configuration with the given client ID.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_max_ack_kl_num(mut self, max: i32) -> Self {
        self.max_ack_kl_num = max;
        self
    }

    /// Set the price adjustment.
    #[must_use]
    pub const fn with_rehab_type(mut self, rehab_type: RehabType) -> Self {
        self.rehab_type = rehab_type;
        self
    }
}

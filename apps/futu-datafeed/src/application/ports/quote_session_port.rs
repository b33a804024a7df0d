//! Quote Session Port (Driven Port)
//!
//! Interface for the vendor quote session the datafeed pages history through.
//! The infrastructure layer provides implementations (OpenD over TCP, and a
//! scripted in-memory session for tests).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Vendor kline type.
///
/// Discriminants are the OpenD `KLType` protocol values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlType {
    /// 1 minute.
    K1M = 1,
    /// 1 day.
    KDay = 2,
    /// 1 week.
    KWeek = 3,
    /// 1 month.
    KMon = 4,
    /// 1 year.
    KYear = 5,
    /// 5 minutes.
    K5M = 6,
    /// 15 minutes.
    K15M = 7,
    /// 30 minutes.
    K30M = 8,
    /// 60 minutes.
    K60M = 9,
    /// 3 minutes.
    K3M = 10,
    /// 1 quarter.
    KQuarter = 11,
}

impl KlType {
    /// Protocol value sent to OpenD.
    #[must_use]
    pub const fn proto_value(self) -> i32 {
        self as i32
    }

    /// Vendor SDK name of the kline type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::K1M => "K_1M",
            Self::KDay => "K_DAY",
            Self::KWeek => "K_WEEK",
            Self::KMon => "K_MON",
            Self::KYear => "K_YEAR",
            Self::K5M => "K_5M",
            Self::K15M => "K_15M",
            Self::K30M => "K_30M",
            Self::K60M => "K_60M",
            Self::K3M => "K_3M",
            Self::KQuarter => "K_QUARTER",
        }
    }
}

impl fmt::Display for KlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters shared by every page of one history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    /// Vendor security code, `"<market>.<symbol>"` (e.g. "HK.00700").
    pub code: String,
    /// Kline type.
    pub ktype: KlType,
    /// Start date, `YYYY-MM-DD`.
    pub start: String,
    /// End date, `YYYY-MM-DD`.
    pub end: String,
}

/// Opaque continuation token returned by the vendor when more pages remain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey(String);

impl PageKey {
    /// Wrap a vendor token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One kline row as delivered by the vendor.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineRow {
    /// Bar time, `YYYY-MM-DD HH:MM:SS` in exchange-local time.
    pub time_key: String,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Volume.
    pub volume: i64,
    /// Turnover.
    pub turnover: f64,
}

/// One page of a history query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KlinePage {
    /// Rows in vendor (chronological) order.
    pub rows: Vec<KlineRow>,
    /// Present when another page is available.
    pub next_page_key: Option<PageKey>,
}

/// Quote session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Could not reach or talk to the quote service.
    #[error("Quote session connection error: {0}")]
    Connection(String),

    /// The vendor answered with a failure status.
    #[error("Vendor error ({ret_type}): {message}")]
    Vendor {
        /// Vendor return type.
        ret_type: i32,
        /// Vendor error payload.
        message: String,
    },

    /// Request timed out.
    #[error("Quote session request timed out after {0} ms")]
    Timeout(u64),

    /// Malformed packet or payload.
    #[error("Quote session protocol error: {0}")]
    Protocol(String),

    /// Session already closed.
    #[error("Quote session is closed")]
    Closed,

    /// Requested feature not supported by this session implementation.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Port for a connected vendor quote session.
///
/// Requests are issued sequentially by a single owner.
#[async_trait]
pub trait QuoteSession: Send {
    /// Fetch one page of historical klines.
    ///
    /// `page_req_key` is `None` for the first page and the previous page's
    /// token afterwards.
    async fn request_history_kline(
        &mut self,
        query: &KlineQuery,
        page_req_key: Option<&PageKey>,
    ) -> Result<KlinePage, SessionError>;

    /// Close the session. Further requests fail with [`SessionError::Closed`].
    async fn close(&mut self);
}

/// Port for opening quote sessions.
#[async_trait]
pub trait QuoteSessionConnector: Send + Sync {
    /// Open a session to the quote service at `host:port`.
    async fn connect(
        &self,
        host: &str,
        port: u16,
        is_encrypted: bool,
    ) -> Result<Box<dyn QuoteSession>, SessionError>;

    /// Whether [`Self::connect`] can open encrypted sessions.
    fn supports_encryption(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kl_type_proto_values() {
        assert_eq!(KlType::K1M.proto_value(), 1);
        assert_eq!(KlType::KDay.proto_value(), 2);
        assert_eq!(KlType::KWeek.proto_value(), 3);
        assert_eq!(KlType::K60M.proto_value(), 9);
    }

    #[test]
    fn kl_type_display_uses_sdk_names() {
        assert_eq!(KlType::K60M.to_string(), "K_60M");
        assert_eq!(KlType::KDay.to_string(), "K_DAY");
    }

    #[test]
    fn session_error_display_carries_vendor_payload() {
        let err = SessionError::Vendor {
            ret_type: -1,
            message: "unknown stock".to_string(),
        };
        assert_eq!(err.to_string(), "Vendor error (-1): unknown stock");
    }
}

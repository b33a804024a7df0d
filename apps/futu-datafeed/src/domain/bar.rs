//! History request and bar records.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use super::market::{Exchange, Interval};

/// Gateway identifier stamped on every bar produced by this datafeed.
pub const GATEWAY_NAME: &str = "FUTU";

/// Request for historical bars of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Instrument symbol without market prefix (e.g. "00700").
    pub symbol: String,
    /// Exchange the symbol trades on.
    pub exchange: Exchange,
    /// Bar interval.
    pub interval: Interval,
    /// Range start. Only the calendar date is sent to the vendor.
    pub start: DateTime<Tz>,
    /// Range end. Only the calendar date is sent to the vendor.
    pub end: DateTime<Tz>,
}

impl HistoryRequest {
    /// Create a new history request.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        exchange: Exchange,
        interval: Interval,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            interval,
            start,
            end,
        }
    }
}

/// One OHLCV bar in the framework's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Instrument symbol without market prefix.
    pub symbol: String,
    /// Exchange the symbol trades on.
    pub exchange: Exchange,
    /// Bar timestamp, localized to Asia/Shanghai.
    pub datetime: DateTime<Tz>,
    /// Bar interval.
    pub interval: Interval,
    /// Traded volume.
    pub volume: i64,
    /// Traded value.
    pub turnover: f64,
    /// Open price.
    pub open_price: f64,
    /// High price.
    pub high_price: f64,
    /// Low price.
    pub low_price: f64,
    /// Close price.
    pub close_price: f64,
    /// Source gateway.
    pub gateway_name: &'static str,
}

impl Bar {
    /// Framework-wide identifier, `"<symbol>.<exchange>"`.
    #[must_use]
    pub fn vt_symbol(&self) -> String {
        format!("{}.{}", self.symbol, self.exchange)
    }
}

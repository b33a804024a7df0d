//! Framework-to-vendor lookup tables and row normalization.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;

use crate::application::ports::{KlType, KlineRow};
use crate::domain::{Bar, Exchange, GATEWAY_NAME, HistoryRequest, Interval};

/// Timestamp layout of vendor kline rows.
pub const TIME_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout sent as query start/end.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timezone attached to every vendor timestamp.
pub const VENDOR_TIMEZONE: Tz = Shanghai;

/// Vendor kline type for a framework interval.
#[must_use]
pub const fn interval_to_kl_type(interval: Interval) -> Option<KlType> {
    match interval {
        Interval::Minute => Some(KlType::K1M),
        Interval::Hour => Some(KlType::K60M),
        Interval::Daily => Some(KlType::KDay),
        Interval::Weekly => Some(KlType::KWeek),
        Interval::Tick => None,
    }
}

/// Vendor market code for a framework exchange.
#[must_use]
pub const fn exchange_to_market(exchange: Exchange) -> Option<&'static str> {
    match exchange {
        Exchange::Sehk => Some("HK"),
        Exchange::Smart | Exchange::Nasdaq => Some("US"),
        Exchange::Sse => Some("SH"),
        Exchange::Szse => Some("SZ"),
        Exchange::Hkfe
        | Exchange::Nyse
        | Exchange::Amex
        | Exchange::Cffex
        | Exchange::Shfe
        | Exchange::Sgx => None,
    }
}

/// Vendor security code, `"<market>.<symbol>"`.
#[must_use]
pub fn vendor_code(market: &str, symbol: &str) -> String {
    format!("{market}.{symbol}")
}

/// Format a request bound as a calendar date, dropping time of day.
#[must_use]
pub fn query_date(value: &DateTime<Tz>) -> String {
    value.format(QUERY_DATE_FORMAT).to_string()
}

/// Parse a vendor time key and localize it to Asia/Shanghai.
pub fn parse_time_key(time_key: &str) -> Result<DateTime<Tz>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(time_key, TIME_KEY_FORMAT)?;
    let localize = |naive: NaiveDateTime| VENDOR_TIMEZONE.from_local_datetime(&naive).earliest();
    // Shanghai observed DST in 1986-1991: earlier reading on overlaps, times
    // inside a spring-forward gap move one hour ahead.
    Ok(localize(naive)
        .or_else(|| {
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(localize)
        })
        .unwrap_or_else(|| VENDOR_TIMEZONE.from_utc_datetime(&naive)))
}

/// Map one vendor row into a bar for `request`.
pub fn row_to_bar(row: &KlineRow, request: &HistoryRequest) -> Result<Bar, chrono::ParseError> {
    Ok(Bar {
        symbol: request.symbol.clone(),
        exchange: request.exchange,
        datetime: parse_time_key(&row.time_key)?,
        interval: request.interval,
        volume: row.volume,
        turnover: row.turnover,
        open_price: row.open,
        high_price: row.high,
        low_price: row.low,
        close_price: row.close,
        gateway_name: GATEWAY_NAME,
    })
}

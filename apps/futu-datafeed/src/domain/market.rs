//! Exchange and interval enums used by history requests and bars.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when an exchange or interval name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMarketError {
    /// Unknown exchange name.
    #[error("unknown exchange: {0}")]
    UnknownExchange(String),

    /// Unknown interval name.
    #[error("unknown interval: {0}")]
    UnknownInterval(String),
}

/// Trading venue as known to the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    /// Shanghai Stock Exchange.
    Sse,
    /// Shenzhen Stock Exchange.
    Szse,
    /// Stock Exchange of Hong Kong.
    Sehk,
    /// Hong Kong Futures Exchange.
    Hkfe,
    /// US smart routing.
    Smart,
    /// NASDAQ.
    Nasdaq,
    /// New York Stock Exchange.
    Nyse,
    /// NYSE American.
    Amex,
    /// China Financial Futures Exchange.
    Cffex,
    /// Shanghai Futures Exchange.
    Shfe,
    /// Singapore Exchange.
    Sgx,
}

impl Exchange {
    /// All exchanges, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Sse,
        Self::Szse,
        Self::Sehk,
        Self::Hkfe,
        Self::Smart,
        Self::Nasdaq,
        Self::Nyse,
        Self::Amex,
        Self::Cffex,
        Self::Shfe,
        Self::Sgx,
    ];

    /// Framework name of the exchange.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sse => "SSE",
            Self::Szse => "SZSE",
            Self::Sehk => "SEHK",
            Self::Hkfe => "HKFE",
            Self::Smart => "SMART",
            Self::Nasdaq => "NASDAQ",
            Self::Nyse => "NYSE",
            Self::Amex => "AMEX",
            Self::Cffex => "CFFEX",
            Self::Shfe => "SHFE",
            Self::Sgx => "SGX",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ParseMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|exchange| exchange.as_str() == upper)
            .ok_or_else(|| ParseMarketError::UnknownExchange(s.to_string()))
    }
}

/// Bar interval as known to the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interval {
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One trading day.
    Daily,
    /// One week.
    Weekly,
    /// Tick data (no fixed bar length).
    Tick,
}

impl Interval {
    /// Short framework name ("1m", "1h", "d", "w", "tick").
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "1m",
            Self::Hour => "1h",
            Self::Daily => "d",
            Self::Weekly => "w",
            Self::Tick => "tick",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseMarketError;

    /// Accepts both the short form ("1m") and the enum name ("MINUTE").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "minute" => Ok(Self::Minute),
            "1h" | "hour" => Ok(Self::Hour),
            "d" | "daily" => Ok(Self::Daily),
            "w" | "weekly" => Ok(Self::Weekly),
            "tick" => Ok(Self::Tick),
            _ => Err(ParseMarketError::UnknownInterval(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_round_trips_through_display() {
        for exchange in Exchange::ALL {
            let parsed: Exchange = exchange.to_string().parse().unwrap();
            assert_eq!(parsed, exchange);
        }
    }

    #[test]
    fn exchange_parse_is_case_insensitive() {
        assert_eq!("sehk".parse::<Exchange>().unwrap(), Exchange::Sehk);
        assert_eq!(" Nasdaq ".parse::<Exchange>().unwrap(), Exchange::Nasdaq);
    }

    #[test]
    fn exchange_parse_unknown() {
        let err = "LSE".parse::<Exchange>().unwrap_err();
        assert_eq!(err, ParseMarketError::UnknownExchange("LSE".to_string()));
    }

    #[test]
    fn interval_parse_accepts_short_and_long_names() {
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::Minute);
        assert_eq!("HOUR".parse::<Interval>().unwrap(), Interval::Hour);
        assert_eq!("Daily".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!("w".parse::<Interval>().unwrap(), Interval::Weekly);
        assert!("5m".parse::<Interval>().is_err());
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&Exchange::Sehk).unwrap();
        assert_eq!(json, "\"SEHK\"");
        let interval: Interval = serde_json::from_str("\"WEEKLY\"").unwrap();
        assert_eq!(interval, Interval::Weekly);
    }
}

//! Command-line argument parsing for the `futu-datafeed` binary.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

use crate::application::mapping::{QUERY_DATE_FORMAT, VENDOR_TIMEZONE};
use crate::domain::{Exchange, HistoryRequest, Interval, ParseMarketError};

/// Usage line printed on argument errors.
pub const USAGE: &str = "usage: futu-datafeed <EXCHANGE> <SYMBOL> <INTERVAL> <START> <END>";

/// Argument errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Wrong number of arguments.
    #[error("expected 5 arguments, got {0}")]
    ArgumentCount(usize),

    /// Exchange or interval not recognized.
    #[error(transparent)]
    Market(#[from] ParseMarketError),

    /// Date neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid date '{0}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),
}

/// Build a history request from the arguments after the program name.
///
/// # Errors
///
/// Returns a `CliError` for a wrong argument count, unknown exchange or
/// interval, or an unparseable date.
pub fn parse_args<I>(args: I) -> Result<HistoryRequest, CliError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let [exchange, symbol, interval, start, end] = args.as_slice() else {
        return Err(CliError::ArgumentCount(args.len()));
    };

    let exchange: Exchange = exchange.parse()?;
    let interval: Interval = interval.parse()?;

    Ok(HistoryRequest::new(
        symbol.trim(),
        exchange,
        interval,
        parse_datetime(start)?,
        parse_datetime(end)?,
    ))
}

/// Parse a date bound in the vendor timezone.
///
/// A bare date is midnight Asia/Shanghai; RFC 3339 values are converted.
///
/// # Errors
///
/// Returns `InvalidDate` if neither layout matches.
pub fn parse_datetime(value: &str) -> Result<DateTime<Tz>, CliError> {
    let value = value.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&VENDOR_TIMEZONE));
    }

    let date = NaiveDate::parse_from_str(value, QUERY_DATE_FORMAT)
        .map_err(|_| CliError::InvalidDate(value.to_string()))?;
    VENDOR_TIMEZONE
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| CliError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono_tz::Asia::Shanghai;

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_full_argument_list() {
        let request =
            parse_args(args(&["sehk", "00700", "d", "2024-01-01", "2024-03-31"])).unwrap();

        assert_eq!(request.exchange, Exchange::Sehk);
        assert_eq!(request.symbol, "00700");
        assert_eq!(request.interval, Interval::Daily);
        assert_eq!(
            request.start,
            Shanghai.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            request.end,
            Shanghai.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let err = parse_args(args(&["SEHK", "00700"])).unwrap_err();
        assert!(matches!(err, CliError::ArgumentCount(2)));
    }

    #[test]
    fn rejects_unknown_exchange() {
        let err = parse_args(args(&["LSE", "VOD", "d", "2024-01-01", "2024-01-02"])).unwrap_err();
        assert!(matches!(
            err,
            CliError::Market(ParseMarketError::UnknownExchange(_))
        ));
    }

    #[test]
    fn rfc3339_converts_to_shanghai() {
        let parsed = parse_datetime("2024-01-02T01:30:00Z").unwrap();
        assert_eq!(parsed, Shanghai.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap());
        assert_eq!(parsed.timezone(), Shanghai);
    }

    #[test]
    fn rejects_other_date_layouts() {
        assert!(matches!(
            parse_datetime("01/02/2024"),
            Err(CliError::InvalidDate(_))
        ));
    }
}

//! Domain Layer
//!
//! Framework-side market data types with no infrastructure dependencies:
//!
//! - [`market`]: Exchange and interval enums of the trading framework
//! - [`bar`]: History requests and the normalized bar record

pub mod bar;
pub mod market;

pub use bar::{Bar, GATEWAY_NAME, HistoryRequest};
pub use market::{Exchange, Interval, ParseMarketError};

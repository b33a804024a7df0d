//! OpenD Quote Client (Driven Adapter)
//!
//! Speaks the OpenD gateway's framed TCP protocol with JSON bodies and
//! exposes it through the [`QuoteSession`] port.
//!
//! # Usage
//!
//! ```ignore
//! use futu_datafeed::infrastructure::opend::{OpenDConfig, OpenDConnector};
//!
//! let connector = OpenDConnector::new(OpenDConfig::default());
//! let mut session = connector.connect("127.0.0.1", 11111, false).await?;
//! let page = session.request_history_kline(&query, None).await?;
//! ```
//!
//! [`QuoteSession`]: crate::application::ports::QuoteSession

pub mod codec;
mod client;
mod config;
mod error;
pub mod messages;

pub use client::{OpenDConnector, OpenDQuoteSession};
pub use config::{OpenDConfig, RehabType};
pub use error::OpenDError;

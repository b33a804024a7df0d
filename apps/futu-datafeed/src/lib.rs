// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::significant_drop_tightening
    )
)]

//! Futu Datafeed - Historical Bars from Futu OpenD
//!
//! Serves historical OHLCV bars for the trading framework from the Futu
//! OpenD gateway.
//!
//! # Architecture (Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Framework-side types
//!   - `market`: `Exchange` and `Interval`
//!   - `bar`: `HistoryRequest` and `Bar`
//!
//! - **Application**: Ports and the datafeed service
//!   - `ports`: `QuoteSession`, `QuoteSessionConnector`, `ProtoEncryption`, `OutputSink`
//!   - `mapping`: interval/exchange tables and row normalization
//!   - `services`: `FutuDatafeed` (init, close, paginated history query)
//!
//! - **Infrastructure**: Adapters
//!   - `opend`: framed TCP client for OpenD
//!   - `encryption`: RSA key-file settings
//!   - `session`: scripted in-memory sessions
//!
//! # Timestamps
//!
//! Vendor timestamps are naive wall-clock times; every bar is localized to
//! Asia/Shanghai regardless of the market it came from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Hexagonal Layers
// =============================================================================

/// Domain layer - Framework-side market data types.
pub mod domain;

/// Application layer - Ports, mappings and the datafeed service.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Command-line argument parsing.
pub mod cli;

/// YAML configuration.
pub mod config;

/// Crate-level error type.
pub mod error;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::{Bar, Exchange, GATEWAY_NAME, HistoryRequest, Interval};

// Application re-exports
pub use application::ports::{
    ConsoleOutput, OutputSink, ProtoEncryption, QuoteSession, QuoteSessionConnector,
    SessionError, TracingOutput,
};
pub use application::services::{BarHistory, Completeness, FutuDatafeed, InitError};

// Infrastructure re-exports
pub use infrastructure::encryption::RsaKeyFileEncryption;
pub use infrastructure::opend::{OpenDConfig, OpenDConnector, OpenDError};
pub use infrastructure::session::{MockConnector, MockQuoteSession};

// Configuration re-exports
pub use config::{Config, ConfigError, FutuSettings, load_config};
pub use error::DatafeedError;

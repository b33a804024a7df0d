//! Application Layer
//!
//! - `ports`: Interfaces for external collaborators (`QuoteSession`,
//!   `ProtoEncryption`, `OutputSink`)
//! - `mapping`: Interval/exchange lookup tables and row normalization
//! - `services`: The historical datafeed itself

pub mod mapping;
pub mod ports;
pub mod services;

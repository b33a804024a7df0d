//! Infrastructure Layer
//!
//! Adapters implementing the application ports:
//!
//! - `opend`: Futu OpenD TCP client (`QuoteSession`)
//! - `encryption`: RSA key-file encryption settings (`ProtoEncryption`)
//! - `session`: Scripted in-memory sessions for tests and offline runs

pub mod encryption;
pub mod opend;
pub mod session;

//! Application ports: interfaces to collaborators outside the datafeed.

mod encryption_port;
mod output_port;
mod quote_session_port;

pub use encryption_port::{EncryptionError, ProtoEncryption};
pub use output_port::{ConsoleOutput, OutputSink, TracingOutput};
pub use quote_session_port::{
    KlType, KlinePage, KlineQuery, KlineRow, PageKey, QuoteSession, QuoteSessionConnector,
    SessionError,
};

//! In-memory quote sessions.

mod mock;

pub use mock::{MockConnector, MockQuoteSession, MockSessionHandle, RecordedRequest};

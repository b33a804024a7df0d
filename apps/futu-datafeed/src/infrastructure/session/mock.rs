//! Scripted quote session for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::application::ports::{
    KlinePage, KlineQuery, PageKey, QuoteSession, QuoteSessionConnector, SessionError,
};

/// A page request seen by a [`MockQuoteSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Query parameters.
    pub query: KlineQuery,
    /// Continuation token, `None` for the first page.
    pub page_req_key: Option<PageKey>,
}

#[derive(Debug, Default)]
struct SessionLog {
    requests: Vec<RecordedRequest>,
    closed: bool,
}

/// Read access to a session's log after the session has been handed off.
#[derive(Debug, Clone, Default)]
pub struct MockSessionHandle {
    log: Arc<Mutex<SessionLog>>,
}

impl MockSessionHandle {
    fn lock(&self) -> MutexGuard<'_, SessionLog> {
        // A poisoned log only means a test already panicked.
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Whether `close` was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Quote session that replays scripted pages.
///
/// Each request pops the next scripted result; once the script is exhausted
/// requests return an empty final page.
#[derive(Debug, Default)]
pub struct MockQuoteSession {
    pages: VecDeque<Result<KlinePage, SessionError>>,
    handle: MockSessionHandle,
}

impl MockQuoteSession {
    /// Create a session with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scripted result.
    #[must_use]
    pub fn with_page(mut self, page: Result<KlinePage, SessionError>) -> Self {
        self.pages.push_back(page);
        self
    }

    /// Handle for inspecting this session's log.
    #[must_use]
    pub fn handle(&self) -> MockSessionHandle {
        self.handle.clone()
    }
}

#[async_trait]
impl QuoteSession for MockQuoteSession {
    async fn request_history_kline(
        &mut self,
        query: &KlineQuery,
        page_req_key: Option<&PageKey>,
    ) -> Result<KlinePage, SessionError> {
        {
            let mut log = self.handle.lock();
            if log.closed {
                return Err(SessionError::Closed);
            }
            log.requests.push(RecordedRequest {
                query: query.clone(),
                page_req_key: page_req_key.cloned(),
            });
        }

        self.pages
            .pop_front()
            .unwrap_or_else(|| Ok(KlinePage::default()))
    }

    async fn close(&mut self) {
        self.handle.lock().closed = true;
    }
}

/// Connector handing out scripted sessions in order.
#[derive(Debug, Default)]
pub struct MockConnector {
    sessions: Mutex<VecDeque<MockQuoteSession>>,
    calls: Mutex<Vec<(String, u16, bool)>>,
    plaintext_only: bool,
}

impl MockConnector {
    /// Create a connector that returns `sessions` one per `connect`.
    ///
    /// Once they run out, `connect` fails with a connection error.
    #[must_use]
    pub fn new(sessions: Vec<MockQuoteSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            calls: Mutex::new(Vec::new()),
            plaintext_only: false,
        }
    }

    /// Report encryption as unsupported, like a plaintext-only transport.
    #[must_use]
    pub fn plaintext_only(mut self) -> Self {
        self.plaintext_only = true;
        self
    }

    /// `(host, port, is_encrypted)` of every `connect` call.
    #[must_use]
    pub fn connect_calls(&self) -> Vec<(String, u16, bool)> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl QuoteSessionConnector for MockConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        is_encrypted: bool,
    ) -> Result<Box<dyn QuoteSession>, SessionError> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((host.to_string(), port, is_encrypted));

        let session = self
            .sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| SessionError::Connection(format!("{host}:{port} refused")))?;

        Ok(Box::new(session))
    }

    fn supports_encryption(&self) -> bool {
        !self.plaintext_only
    }
}

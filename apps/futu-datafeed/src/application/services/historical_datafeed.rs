//! Historical Datafeed Service
//!
//! Owns the quote session lifecycle and runs the paginated history kline
//! query, normalizing vendor rows into [`Bar`]s.
//!
//! Every failure path degrades to "return what we have" plus a diagnostic on
//! the caller's [`OutputSink`]; nothing here returns an error to the caller
//! except [`FutuDatafeed::try_init`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::application::mapping::{
    exchange_to_market, interval_to_kl_type, query_date, row_to_bar, vendor_code,
};
use crate::application::ports::{
    ConsoleOutput, EncryptionError, KlineQuery, OutputSink, ProtoEncryption, QuoteSession,
    QuoteSessionConnector, SessionError,
};
use crate::config::FutuSettings;
use crate::domain::{Bar, HistoryRequest};

/// Key file location relative to the install directory.
pub const RSA_KEY_DIR: &str = "rsa_key";
/// Key file name inside [`RSA_KEY_DIR`].
pub const RSA_KEY_FILE: &str = "rsa_private_key.txt";

/// Resolve the RSA private key path for an install directory.
#[must_use]
pub fn rsa_key_path(install_dir: &Path) -> PathBuf {
    install_dir.join(RSA_KEY_DIR).join(RSA_KEY_FILE)
}

/// Directory containing the running executable, or `.` when unknown.
#[must_use]
pub fn default_install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Initialization errors.
#[derive(Debug, Error)]
pub enum InitError {
    /// Encryption settings could not be applied.
    #[error("Failed to configure encrypted connection: {source}")]
    Encryption {
        /// Key file that was used.
        key_path: PathBuf,
        /// The underlying error.
        source: EncryptionError,
    },

    /// The quote session could not be opened.
    #[error("Failed to open quote session: {0}")]
    Connect(#[from] SessionError),
}

/// Whether a history query delivered every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completeness {
    /// Pagination ran until the vendor reported no more pages.
    Complete,
    /// A later page failed; bars from earlier pages were kept.
    Partial {
        /// Pages that were fetched successfully.
        pages_fetched: usize,
        /// The failure that stopped pagination.
        error: SessionError,
    },
}

/// Bars returned by a history query, plus how pagination ended.
#[derive(Debug, Clone, PartialEq)]
pub struct BarHistory {
    /// Bars in chronological (vendor) order.
    pub bars: Vec<Bar>,
    /// Pagination outcome.
    pub completeness: Completeness,
}

impl BarHistory {
    const fn empty() -> Self {
        Self {
            bars: Vec::new(),
            completeness: Completeness::Complete,
        }
    }

    /// True when pagination stopped on a failed page.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self.completeness, Completeness::Partial { .. })
    }
}

/// Session lifecycle.
enum SessionState {
    Uninitialized,
    Connected(Box<dyn QuoteSession>),
    Closed,
}

impl SessionState {
    const fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connected(_) => "connected",
            Self::Closed => "closed",
        }
    }
}

/// Futu historical bar datafeed.
pub struct FutuDatafeed {
    connector: Arc<dyn QuoteSessionConnector>,
    encryption: Box<dyn ProtoEncryption>,
    output: Arc<dyn OutputSink>,
    install_dir: PathBuf,
    state: SessionState,
}

impl fmt::Debug for FutuDatafeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutuDatafeed")
            .field("install_dir", &self.install_dir)
            .field("state", &self.state.name())
            .finish_non_exhaustive()
    }
}

impl FutuDatafeed {
    /// Create an uninitialized datafeed.
    ///
    /// Lifecycle diagnostics go to [`ConsoleOutput`] until replaced with
    /// [`Self::with_output`].
    #[must_use]
    pub fn new(
        connector: Arc<dyn QuoteSessionConnector>,
        encryption: Box<dyn ProtoEncryption>,
    ) -> Self {
        Self {
            connector,
            encryption,
            output: Arc::new(ConsoleOutput),
            install_dir: default_install_dir(),
            state: SessionState::Uninitialized,
        }
    }

    /// Set the sink for `init` diagnostics.
    #[must_use]
    pub fn with_output(mut self, output: Arc<dyn OutputSink>) -> Self {
        self.output = output;
        self
    }

    /// Set the directory the RSA key is resolved against.
    #[must_use]
    pub fn with_install_dir(mut self, install_dir: impl Into<PathBuf>) -> Self {
        self.install_dir = install_dir.into();
        self
    }

    /// Whether a session is open.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    /// Initialize, reporting the outcome through the datafeed's output sink.
    ///
    /// Returns `true` when a session was opened.
    pub async fn init(&mut self, settings: &FutuSettings) -> bool {
        match self.try_init(settings).await {
            Ok(()) => {
                self.output.output("Futu datafeed initialized");
                true
            }
            Err(InitError::Encryption { key_path, source }) => {
                tracing::warn!(
                    error = %source,
                    key_path = %key_path.display(),
                    "Encryption setup failed"
                );
                self.output
                    .output(&format!("Failed to configure encrypted connection: {source}"));
                self.output
                    .output(&format!("RSA private key path: {}", key_path.display()));
                false
            }
            Err(InitError::Connect(error)) => {
                tracing::warn!(%error, "Quote session connect failed");
                self.output
                    .output(&format!("Futu datafeed initialization failed: {error}"));
                false
            }
        }
    }

    /// Initialize and return the failure instead of reporting it.
    ///
    /// Encryption failures, including a connector that cannot encrypt, leave
    /// the current session untouched. Otherwise any current session is
    /// closed before the new one is opened.
    pub async fn try_init(&mut self, settings: &FutuSettings) -> Result<(), InitError> {
        if settings.is_encrypted {
            if !self.connector.supports_encryption() {
                return Err(InitError::Connect(SessionError::Unsupported(
                    "encrypted connections are not supported by this connector".to_string(),
                )));
            }
            let install_dir = settings
                .install_dir
                .as_deref()
                .unwrap_or(self.install_dir.as_path());
            let key_path = rsa_key_path(install_dir);
            self.configure_encryption(&key_path)
                .map_err(|source| InitError::Encryption { key_path, source })?;
        }

        self.close().await;

        let session = self
            .connector
            .connect(&settings.address, settings.port, settings.is_encrypted)
            .await?;
        self.state = SessionState::Connected(session);

        tracing::info!(
            address = %settings.address,
            port = settings.port,
            encrypted = settings.is_encrypted,
            "Quote session opened"
        );
        Ok(())
    }

    fn configure_encryption(&mut self, key_path: &Path) -> Result<(), EncryptionError> {
        self.encryption.enable_proto_encrypt(true)?;
        if let Err(error) = self.encryption.set_init_rsa_file(key_path) {
            if let Err(reset) = self.encryption.enable_proto_encrypt(false) {
                tracing::warn!(error = %reset, "Failed to disable protocol encryption");
            }
            return Err(error);
        }
        Ok(())
    }

    /// Close the session if one is open. Safe to call at any time.
    pub async fn close(&mut self) {
        if let SessionState::Connected(mut session) =
            std::mem::replace(&mut self.state, SessionState::Closed)
        {
            session.close().await;
            tracing::info!("Quote session closed");
        }
    }

    /// Query historical bars.
    ///
    /// Returns whatever could be fetched; a failed later page silently
    /// truncates the result. Use [`Self::query_bar_history_detailed`] to tell
    /// the two apart.
    pub async fn query_bar_history(
        &mut self,
        request: &HistoryRequest,
        output: &dyn OutputSink,
    ) -> Vec<Bar> {
        self.query_bar_history_detailed(request, output).await.bars
    }

    /// Query historical bars and report whether pagination completed.
    pub async fn query_bar_history_detailed(
        &mut self,
        request: &HistoryRequest,
        output: &dyn OutputSink,
    ) -> BarHistory {
        let SessionState::Connected(session) = &mut self.state else {
            tracing::warn!(symbol = %request.symbol, "History query before init");
            output.output("Futu datafeed is not initialized");
            return BarHistory::empty();
        };

        let Some(ktype) = interval_to_kl_type(request.interval) else {
            tracing::warn!(interval = %request.interval, "Unsupported interval");
            output.output(&format!("Unsupported interval: {}", request.interval));
            return BarHistory::empty();
        };

        let Some(market) = exchange_to_market(request.exchange) else {
            tracing::warn!(exchange = %request.exchange, "Unsupported exchange");
            output.output(&format!("Unsupported exchange: {}", request.exchange));
            return BarHistory::empty();
        };

        let query = KlineQuery {
            code: vendor_code(market, &request.symbol),
            ktype,
            start: query_date(&request.start),
            end: query_date(&request.end),
        };

        output.output(&format!(
            "Querying klines: {}, interval: {}, start: {}, end: {}",
            query.code, ktype, request.start, request.end
        ));

        let first_page = match session.request_history_kline(&query, None).await {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!(code = %query.code, %error, "History kline query failed");
                output.output(&format!("Kline query failed: {error}"));
                return BarHistory::empty();
            }
        };

        let mut rows = first_page.rows;
        let mut next_page_key = first_page.next_page_key;
        let mut pages_fetched = 1;
        let mut completeness = Completeness::Complete;

        while let Some(page_key) = next_page_key.take() {
            match session.request_history_kline(&query, Some(&page_key)).await {
                Ok(page) => {
                    pages_fetched += 1;
                    tracing::debug!(
                        code = %query.code,
                        page = pages_fetched,
                        rows = page.rows.len(),
                        "Fetched kline page"
                    );
                    rows.extend(page.rows);
                    next_page_key = page.next_page_key;
                }
                Err(error) => {
                    tracing::warn!(
                        code = %query.code,
                        pages_fetched,
                        %error,
                        "Kline page query failed, returning partial history"
                    );
                    output.output(&format!("Kline page query failed: {error}"));
                    completeness = Completeness::Partial {
                        pages_fetched,
                        error,
                    };
                    break;
                }
            }
        }

        let mut bars = Vec::with_capacity(rows.len());
        for row in &rows {
            match row_to_bar(row, request) {
                Ok(bar) => bars.push(bar),
                Err(error) => {
                    tracing::warn!(time_key = %row.time_key, %error, "Skipping kline row");
                    output.output(&format!(
                        "Skipping kline row with invalid time '{}': {error}",
                        row.time_key
                    ));
                }
            }
        }

        output.output(&format!("Fetched {} kline bars", bars.len()));
        tracing::info!(
            code = %query.code,
            bars = bars.len(),
            pages = pages_fetched,
            "History kline query finished"
        );

        BarHistory { bars, completeness }
    }
}

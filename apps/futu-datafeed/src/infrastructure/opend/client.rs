//! OpenD quote session over TCP.
//!
//! One request is in flight at a time. Replies are paired with requests by
//! serial number; push packets and other unrelated replies are skipped. When
//! OpenD asks for heartbeats, a `KeepAlive` is sent ahead of the next request
//! once the interval has elapsed since the last exchange.
//!
//! A timeout or framing failure can leave a partial packet on the socket, so
//! the connection is dropped and later requests fail with `Closed`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};

use super::codec::{PROTO_FMT_JSON, Packet, read_packet, write_packet};
use super::config::OpenDConfig;
use super::error::OpenDError;
use super::messages::{
    InitConnectC2S, InitConnectS2C, KL_FIELDS_OHLCV_TURNOVER, KLine, KeepAliveC2S, KeepAliveS2C,
    PACKET_ENC_ALGO_NONE, PUSH_PROTO_FMT_JSON, Request, RequestHistoryKlC2S, RequestHistoryKlS2C,
    Security, decode_response, proto_id,
};
use crate::application::ports::{
    KlineQuery, KlinePage, KlineRow, PageKey, QuoteSession, QuoteSessionConnector, SessionError,
};

/// Language tag sent in the handshake.
const PROGRAMMING_LANGUAGE: &str = "Rust";

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl From<KLine> for KlineRow {
    fn from(kline: KLine) -> Self {
        Self {
            time_key: kline.time,
            open: kline.open_price,
            high: kline.high_price,
            low: kline.low_price,
            close: kline.close_price,
            volume: kline.volume,
            turnover: kline.turnover,
        }
    }
}

/// Live OpenD connection.
#[derive(Debug)]
pub struct OpenDQuoteSession {
    stream: Option<TcpStream>,
    config: OpenDConfig,
    serial_no: u32,
    keep_alive_interval: Option<Duration>,
    last_exchange: Instant,
    conn_id: u64,
}

impl OpenDQuoteSession {
    /// Connect and perform the `InitConnect` handshake.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if the socket or handshake does not complete in
    /// time, `Network` for socket failures, or `Api` if OpenD rejects the
    /// handshake.
    pub async fn connect(host: &str, port: u16, config: OpenDConfig) -> Result<Self, OpenDError> {
        let addr = format!("{host}:{port}");
        let stream = timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| OpenDError::Timeout(duration_ms(config.connect_timeout)))??;
        stream.set_nodelay(true)?;

        let mut session = Self {
            stream: Some(stream),
            config,
            serial_no: 0,
            keep_alive_interval: None,
            last_exchange: Instant::now(),
            conn_id: 0,
        };

        let handshake = InitConnectC2S {
            client_ver: session.config.client_ver,
            client_id: session.config.client_id.clone(),
            recv_notify: false,
            packet_enc_algo: PACKET_ENC_ALGO_NONE,
            push_proto_fmt: PUSH_PROTO_FMT_JSON,
            programming_language: PROGRAMMING_LANGUAGE.to_string(),
        };
        let s2c: InitConnectS2C = session
            .round_trip(proto_id::INIT_CONNECT, &handshake)
            .await?;

        session.conn_id = s2c.conn_id;
        session.keep_alive_interval = u64::try_from(s2c.keep_alive_interval)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        tracing::info!(
            addr = %addr,
            conn_id = session.conn_id,
            server_ver = s2c.server_ver,
            keep_alive_secs = s2c.keep_alive_interval,
            "Connected to OpenD"
        );

        Ok(session)
    }

    /// Fetch one page of historical klines.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSecurity` for malformed codes, or any transport or
    /// API error from the exchange.
    pub async fn request_history_kl(
        &mut self,
        query: &KlineQuery,
        page_req_key: Option<&PageKey>,
    ) -> Result<KlinePage, OpenDError> {
        let c2s = RequestHistoryKlC2S {
            rehab_type: self.config.rehab_type.value(),
            kl_type: query.ktype.proto_value(),
            security: Security::from_vendor_code(&query.code)?,
            begin_time: query.start.clone(),
            end_time: query.end.clone(),
            max_ack_kl_num: self.config.max_ack_kl_num,
            need_kl_fields_flag: KL_FIELDS_OHLCV_TURNOVER,
            next_req_key: page_req_key.map(|key| key.as_str().to_string()),
        };

        let s2c: RequestHistoryKlS2C = self.call(proto_id::QOT_REQUEST_HISTORY_KL, &c2s).await?;

        tracing::debug!(
            code = %query.code,
            rows = s2c.kl_list.len(),
            has_next = s2c.next_req_key.is_some(),
            "Received kline page"
        );

        Ok(KlinePage {
            rows: s2c.kl_list.into_iter().map(KlineRow::from).collect(),
            next_page_key: s2c
                .next_req_key
                .filter(|key| !key.is_empty())
                .map(PageKey::new),
        })
    }

    /// Close the socket. Later requests fail with `Closed`.
    pub async fn shutdown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::debug!(error = %e, "OpenD socket shutdown failed");
            }
            tracing::info!(conn_id = self.conn_id, "Disconnected from OpenD");
        }
    }

    async fn call<C, S>(&mut self, proto_id: u32, c2s: &C) -> Result<S, OpenDError>
    where
        C: Serialize + Sync,
        S: DeserializeOwned + Send,
    {
        self.keep_alive_if_due().await?;
        self.round_trip(proto_id, c2s).await
    }

    async fn keep_alive_if_due(&mut self) -> Result<(), OpenDError> {
        let Some(interval) = self.keep_alive_interval else {
            return Ok(());
        };
        if self.last_exchange.elapsed() < interval {
            return Ok(());
        }

        let c2s = KeepAliveC2S {
            time: chrono::Utc::now().timestamp(),
        };
        let s2c: KeepAliveS2C = self.round_trip(proto_id::KEEP_ALIVE, &c2s).await?;
        tracing::trace!(server_time = s2c.time, "KeepAlive acknowledged");
        Ok(())
    }

    async fn round_trip<C, S>(&mut self, proto_id: u32, c2s: &C) -> Result<S, OpenDError>
    where
        C: Serialize + Sync,
        S: DeserializeOwned + Send,
    {
        let body = serde_json::to_vec(&Request { c2s })?;
        self.serial_no = self.serial_no.wrapping_add(1);
        let serial_no = self.serial_no;
        let request_timeout = self.config.request_timeout;

        let exchanged = timeout(request_timeout, self.exchange(proto_id, serial_no, &body))
            .await
            .unwrap_or_else(|_| Err(OpenDError::Timeout(duration_ms(request_timeout))));
        let packet = match exchanged {
            Ok(packet) => packet,
            Err(error) => {
                if error.breaks_connection() {
                    self.drop_stream(&error);
                }
                return Err(error);
            }
        };
        self.last_exchange = Instant::now();

        if packet.header.proto_fmt != PROTO_FMT_JSON {
            return Err(OpenDError::UnsupportedFormat(packet.header.proto_fmt));
        }
        decode_response(&packet.body, proto_id)
    }

    fn drop_stream(&mut self, error: &OpenDError) {
        if self.stream.take().is_some() {
            tracing::warn!(
                conn_id = self.conn_id,
                %error,
                "Dropping OpenD connection after transport failure"
            );
        }
    }

    async fn exchange(
        &mut self,
        proto_id: u32,
        serial_no: u32,
        body: &[u8],
    ) -> Result<Packet, OpenDError> {
        let stream = self.stream.as_mut().ok_or(OpenDError::Closed)?;
        write_packet(stream, proto_id, serial_no, body).await?;

        loop {
            let packet = read_packet(stream).await?;
            if packet.header.proto_id == proto_id && packet.header.serial_no == serial_no {
                return Ok(packet);
            }
            tracing::trace!(
                proto_id = packet.header.proto_id,
                serial_no = packet.header.serial_no,
                "Skipping unrelated OpenD packet"
            );
        }
    }
}

#[async_trait]
impl QuoteSession for OpenDQuoteSession {
    async fn request_history_kline(
        &mut self,
        query: &KlineQuery,
        page_req_key: Option<&PageKey>,
    ) -> Result<KlinePage, SessionError> {
        Ok(self.request_history_kl(query, page_req_key).await?)
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}

/// Opens [`OpenDQuoteSession`]s.
#[derive(Debug, Clone, Default)]
pub struct OpenDConnector {
    config: OpenDConfig,
}

impl OpenDConnector {
    /// Create a connector using `config` for every session.
    #[must_use]
    pub const fn new(config: OpenDConfig) -> Self {
        Self { config }
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &OpenDConfig {
        &self.config
    }
}

#[async_trait]
impl QuoteSessionConnector for OpenDConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        is_encrypted: bool,
    ) -> Result<Box<dyn QuoteSession>, SessionError> {
        if is_encrypted {
            return Err(OpenDError::EncryptionUnsupported.into());
        }
        let session = OpenDQuoteSession::connect(host, port, self.config.clone()).await?;
        Ok(Box::new(session))
    }

    fn supports_encryption(&self) -> bool {
        false
    }
}

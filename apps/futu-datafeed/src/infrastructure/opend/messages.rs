//! OpenD JSON Message Types
//!
//! Wire format types for the JSON body format. Requests wrap their payload as
//! `{"c2s": {...}}`; replies carry `retType`, `retMsg`, `errCode` and an
//! optional `s2c` payload.
//!
//! # Protocols
//!
//! - `InitConnect` (1001): handshake, returns the keep-alive interval
//! - `KeepAlive` (1004): heartbeat
//! - `Qot_RequestHistoryKL` (3103): one page of historical klines
//!
//! 64-bit integers may be rendered as JSON strings, so those fields accept
//! either form.

use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use super::error::OpenDError;

/// Protocol IDs used by this client.
pub mod proto_id {
    /// Connection handshake.
    pub const INIT_CONNECT: u32 = 1001;
    /// Heartbeat.
    pub const KEEP_ALIVE: u32 = 1004;
    /// Historical kline page.
    pub const QOT_REQUEST_HISTORY_KL: u32 = 3103;
}

/// `retType` value for success.
pub const RET_TYPE_SUCCEED: i32 = 0;

/// `retType` assumed when a reply omits it.
pub const RET_TYPE_UNKNOWN: i32 = -400;

/// Kline field flags: high, open, low, close, volume and turnover.
pub const KL_FIELDS_OHLCV_TURNOVER: i64 = 1 | 2 | 4 | 8 | 32 | 64;

/// Value of `packetEncAlgo` for plaintext connections.
pub const PACKET_ENC_ALGO_NONE: i32 = -1;

/// `pushProtoFmt` value selecting JSON pushes.
pub const PUSH_PROTO_FMT_JSON: i32 = 1;

// =============================================================================
// Envelope
// =============================================================================

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct Request<'a, T> {
    /// Request payload.
    pub c2s: &'a T,
}

/// Incoming reply envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    /// Result code, `0` on success.
    #[serde(default = "unknown_ret_type")]
    pub ret_type: i32,
    /// Error description.
    #[serde(default)]
    pub ret_msg: String,
    /// Vendor error code.
    #[serde(default)]
    pub err_code: i32,
    /// Reply payload.
    pub s2c: Option<T>,
}

const fn unknown_ret_type() -> i32 {
    RET_TYPE_UNKNOWN
}

impl<T> Response<T> {
    /// Unwrap the payload of a successful reply.
    ///
    /// # Errors
    ///
    /// Returns `Api` when `retType` is not success, or `MissingPayload` when
    /// a successful reply has no `s2c`.
    pub fn into_result(self, proto_id: u32) -> Result<T, OpenDError> {
        if self.ret_type != RET_TYPE_SUCCEED {
            return Err(OpenDError::Api {
                ret_type: self.ret_type,
                err_code: self.err_code,
                message: self.ret_msg,
            });
        }
        self.s2c.ok_or(OpenDError::MissingPayload(proto_id))
    }
}

/// Decode a reply body and unwrap its payload.
///
/// # Errors
///
/// Returns `JsonParse` for malformed bodies, otherwise as
/// [`Response::into_result`].
pub fn decode_response<T: DeserializeOwned>(body: &[u8], proto_id: u32) -> Result<T, OpenDError> {
    let response: Response<T> = serde_json::from_slice(body)?;
    response.into_result(proto_id)
}

// =============================================================================
// InitConnect (1001)
// =============================================================================

/// Handshake request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConnectC2S {
    /// Client version number.
    pub client_ver: i32,
    /// Client identifier.
    #[serde(rename = "clientID")]
    pub client_id: String,
    /// Whether to receive push notifications.
    pub recv_notify: bool,
    /// Packet encryption algorithm, `-1` for none.
    pub packet_enc_algo: i32,
    /// Push body format.
    pub push_proto_fmt: i32,
    /// Client language tag.
    pub programming_language: String,
}

/// Handshake reply.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConnectS2C {
    /// OpenD version.
    #[serde(default)]
    pub server_ver: i32,
    /// Logged-in user.
    #[serde(rename = "loginUserID", default, deserialize_with = "lenient_u64")]
    pub login_user_id: u64,
    /// Connection ID.
    #[serde(rename = "connID", default, deserialize_with = "lenient_u64")]
    pub conn_id: u64,
    /// Seconds between heartbeats, `0` when none are required.
    #[serde(default)]
    pub keep_alive_interval: i32,
}

// =============================================================================
// KeepAlive (1004)
// =============================================================================

/// Heartbeat request.
#[derive(Debug, Clone, Serialize)]
pub struct KeepAliveC2S {
    /// Client Unix time in seconds.
    pub time: i64,
}

/// Heartbeat reply.
#[derive(Debug, Clone, Deserialize)]
pub struct KeepAliveS2C {
    /// Server Unix time in seconds.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub time: i64,
}

// =============================================================================
// Qot_RequestHistoryKL (3103)
// =============================================================================

/// Quote market IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum QotMarket {
    /// Hong Kong securities.
    HkSecurity = 1,
    /// US securities.
    UsSecurity = 11,
    /// Shanghai A-shares.
    CnshSecurity = 21,
    /// Shenzhen A-shares.
    CnszSecurity = 22,
}

impl QotMarket {
    /// Wire value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self as i32
    }
}

impl FromStr for QotMarket {
    type Err = OpenDError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HK" => Ok(Self::HkSecurity),
            "US" => Ok(Self::UsSecurity),
            "SH" => Ok(Self::CnshSecurity),
            "SZ" => Ok(Self::CnszSecurity),
            other => Err(OpenDError::InvalidSecurity(other.to_string())),
        }
    }
}

/// Security identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Security {
    /// Market ID.
    pub market: i32,
    /// Symbol within the market.
    pub code: String,
}

impl Security {
    /// Split a vendor code such as `HK.00700`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSecurity` for codes without a `.`, with an empty
    /// symbol, or with an unknown market prefix.
    pub fn from_vendor_code(code: &str) -> Result<Self, OpenDError> {
        let (market, symbol) = code
            .split_once('.')
            .filter(|(_, symbol)| !symbol.is_empty())
            .ok_or_else(|| OpenDError::InvalidSecurity(code.to_string()))?;
        let market: QotMarket = market
            .parse()
            .map_err(|_| OpenDError::InvalidSecurity(code.to_string()))?;

        Ok(Self {
            market: market.value(),
            code: symbol.to_string(),
        })
    }
}

/// Historical kline page request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHistoryKlC2S {
    /// Price adjustment.
    pub rehab_type: i32,
    /// Kline period.
    pub kl_type: i32,
    /// Security.
    pub security: Security,
    /// Start, `yyyy-MM-dd` or `yyyy-MM-dd HH:mm:ss`.
    pub begin_time: String,
    /// End, same layout as `begin_time`.
    pub end_time: String,
    /// Page size limit.
    #[serde(rename = "maxAckKLNum")]
    pub max_ack_kl_num: i32,
    /// Requested kline fields bitmask.
    #[serde(rename = "needKLFieldsFlag")]
    pub need_kl_fields_flag: i64,
    /// Continuation token from the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_req_key: Option<String>,
}

/// Historical kline page reply.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHistoryKlS2C {
    /// Klines in this page.
    #[serde(default)]
    pub kl_list: Vec<KLine>,
    /// Continuation token, absent on the last page.
    #[serde(default)]
    pub next_req_key: Option<String>,
}

/// One kline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KLine {
    /// `yyyy-MM-dd HH:mm:ss`.
    pub time: String,
    /// Placeholder kline with no trades.
    #[serde(default)]
    pub is_blank: bool,
    /// High.
    #[serde(default)]
    pub high_price: f64,
    /// Open.
    #[serde(default)]
    pub open_price: f64,
    /// Low.
    #[serde(default)]
    pub low_price: f64,
    /// Close.
    #[serde(default)]
    pub close_price: f64,
    /// Volume.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub volume: i64,
    /// Turnover.
    #[serde(default)]
    pub turnover: f64,
}

// =============================================================================
// Lenient integers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString<T> {
    Int(T),
    Str(String),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: std::fmt::Display,
{
    match IntOrString::<T>::deserialize(deserializer)? {
        IntOrString::Int(value) => Ok(value),
        IntOrString::Str(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    lenient(deserializer)
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    lenient(deserializer)
}

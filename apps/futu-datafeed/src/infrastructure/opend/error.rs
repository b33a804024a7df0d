//! OpenD-specific error types.

use thiserror::Error;

use crate::application::ports::SessionError;

/// Errors from the OpenD client.
#[derive(Debug, Error)]
pub enum OpenDError {
    /// Socket error (retryable by reconnecting).
    #[error("Network error: {0}")]
    Network(String),

    /// JSON encoding or decoding failed.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Packet did not start with the `FT` flag.
    #[error("Invalid packet header flag: {0:?}")]
    InvalidHeaderFlag([u8; 2]),

    /// Body did not match the SHA-1 in its header.
    #[error("Packet body checksum mismatch (proto {proto_id}, serial {serial_no})")]
    ChecksumMismatch {
        /// Protocol ID of the packet.
        proto_id: u32,
        /// Serial number of the packet.
        serial_no: u32,
    },

    /// Body length exceeds the accepted maximum.
    #[error("Packet body too large: {0} bytes")]
    BodyTooLarge(usize),

    /// Reply used a body format other than JSON.
    #[error("Unsupported body format {0} (expected JSON)")]
    UnsupportedFormat(u8),

    /// No reply within the configured timeout.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// OpenD answered with a failure.
    #[error("API error: {ret_type}/{err_code} - {message}")]
    Api {
        /// `retType` field.
        ret_type: i32,
        /// `errCode` field.
        err_code: i32,
        /// `retMsg` field.
        message: String,
    },

    /// Successful reply without the `s2c` payload.
    #[error("Reply to proto {0} carried no payload")]
    MissingPayload(u32),

    /// Vendor code could not be split into market and symbol.
    #[error("Invalid security code: {0}")]
    InvalidSecurity(String),

    /// Encrypted transport was requested.
    #[error("Encrypted OpenD connections are not supported by this client")]
    EncryptionUnsupported,

    /// Connection already closed.
    #[error("Connection closed")]
    Closed,
}

impl OpenDError {
    /// True when the byte stream can no longer be trusted to sit on a packet
    /// boundary, so the connection must be dropped.
    #[must_use]
    pub const fn breaks_connection(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Timeout(_)
                | Self::InvalidHeaderFlag(_)
                | Self::ChecksumMismatch { .. }
                | Self::BodyTooLarge(_)
                | Self::Closed
        )
    }
}

impl From<std::io::Error> for OpenDError {
    fn from(err: std::io::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for OpenDError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

impl From<OpenDError> for SessionError {
    fn from(err: OpenDError) -> Self {
        match err {
            OpenDError::Network(msg) => Self::Connection(msg),
            OpenDError::Api {
                ret_type, message, ..
            } => Self::Vendor { ret_type, message },
            OpenDError::Timeout(ms) => Self::Timeout(ms),
            OpenDError::Closed => Self::Closed,
            unsupported @ OpenDError::EncryptionUnsupported => {
                Self::Unsupported(unsupported.to_string())
            }
            other @ (OpenDError::JsonParse(_)
            | OpenDError::InvalidHeaderFlag(_)
            | OpenDError::ChecksumMismatch { .. }
            | OpenDError::BodyTooLarge(_)
            | OpenDError::UnsupportedFormat(_)
            | OpenDError::MissingPayload(_)
            | OpenDError::InvalidSecurity(_)) => Self::Protocol(other.to_string()),
        }
    }
}

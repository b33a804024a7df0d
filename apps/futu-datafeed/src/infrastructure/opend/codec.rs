//! OpenD Packet Codec
//!
//! Every OpenD message is a fixed 44-byte header followed by a body. All
//! integers are little-endian.
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0      | 2    | Flag, always `FT`             |
//! | 2      | 4    | Protocol ID                   |
//! | 6      | 1    | Body format (0 protobuf, 1 JSON) |
//! | 7      | 1    | Protocol version              |
//! | 8      | 4    | Serial number                 |
//! | 12     | 4    | Body length                   |
//! | 16     | 20   | SHA-1 of the body             |
//! | 36     | 8    | Reserved                      |
//!
//! This client only speaks the JSON body format.

use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::OpenDError;

/// Header length in bytes.
pub const HEADER_LEN: usize = 44;

/// Leading packet flag.
pub const HEADER_FLAG: [u8; 2] = *b"FT";

/// Body format code for JSON.
pub const PROTO_FMT_JSON: u8 = 1;

/// Protocol version written in outgoing headers.
pub const PROTO_VERSION: u8 = 0;

/// Largest body accepted from the wire.
pub const MAX_BODY_LEN: usize = 16 * 1024 * 1024;

/// Decoded packet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    /// Protocol ID.
    pub proto_id: u32,
    /// Body format.
    pub proto_fmt: u8,
    /// Protocol version.
    pub proto_ver: u8,
    /// Serial number pairing requests with replies.
    pub serial_no: u32,
    /// Body length in bytes.
    pub body_len: u32,
    /// SHA-1 digest of the body.
    pub body_sha1: [u8; 20],
}

impl PacketHeader {
    /// Build the header for a JSON `body`.
    ///
    /// # Errors
    ///
    /// Returns `BodyTooLarge` if the body exceeds [`MAX_BODY_LEN`].
    pub fn for_body(proto_id: u32, serial_no: u32, body: &[u8]) -> Result<Self, OpenDError> {
        if body.len() > MAX_BODY_LEN {
            return Err(OpenDError::BodyTooLarge(body.len()));
        }
        let body_len =
            u32::try_from(body.len()).map_err(|_| OpenDError::BodyTooLarge(body.len()))?;

        Ok(Self {
            proto_id,
            proto_fmt: PROTO_FMT_JSON,
            proto_ver: PROTO_VERSION,
            serial_no,
            body_len,
            body_sha1: body_sha1(body),
        })
    }

    /// Serialize to wire bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&HEADER_FLAG);
        buf[2..6].copy_from_slice(&self.proto_id.to_le_bytes());
        buf[6] = self.proto_fmt;
        buf[7] = self.proto_ver;
        buf[8..12].copy_from_slice(&self.serial_no.to_le_bytes());
        buf[12..16].copy_from_slice(&self.body_len.to_le_bytes());
        buf[16..36].copy_from_slice(&self.body_sha1);
        buf
    }

    /// Parse wire bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeaderFlag` if the buffer does not start with `FT`, or
    /// `BodyTooLarge` if the advertised body exceeds [`MAX_BODY_LEN`].
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self, OpenDError> {
        let flag = [buf[0], buf[1]];
        if flag != HEADER_FLAG {
            return Err(OpenDError::InvalidHeaderFlag(flag));
        }

        let body_len = le_u32(buf, 12);
        let len = body_len as usize;
        if len > MAX_BODY_LEN {
            return Err(OpenDError::BodyTooLarge(len));
        }

        let mut body_sha1 = [0u8; 20];
        body_sha1.copy_from_slice(&buf[16..36]);

        Ok(Self {
            proto_id: le_u32(buf, 2),
            proto_fmt: buf[6],
            proto_ver: buf[7],
            serial_no: le_u32(buf, 8),
            body_len,
            body_sha1,
        })
    }
}

/// A header and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet header.
    pub header: PacketHeader,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

const fn le_u32(buf: &[u8; HEADER_LEN], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// SHA-1 digest of `body`.
#[must_use]
pub fn body_sha1(body: &[u8]) -> [u8; 20] {
    let digest = Sha1::digest(body);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// Encode a complete packet (header followed by body).
///
/// # Errors
///
/// Returns `BodyTooLarge` if the body exceeds [`MAX_BODY_LEN`].
pub fn encode_packet(proto_id: u32, serial_no: u32, body: &[u8]) -> Result<Vec<u8>, OpenDError> {
    let header = PacketHeader::for_body(proto_id, serial_no, body)?;
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(body);
    Ok(out)
}

/// Write one packet and flush.
///
/// # Errors
///
/// Returns an error if the body is too large or the write fails.
pub async fn write_packet<W>(
    writer: &mut W,
    proto_id: u32,
    serial_no: u32,
    body: &[u8],
) -> Result<(), OpenDError>
where
    W: AsyncWrite + Unpin + Send,
{
    let bytes = encode_packet(proto_id, serial_no, body)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one packet and verify its body checksum.
///
/// # Errors
///
/// Returns `Closed` on a clean EOF before a header, a framing error for a
/// malformed header, `ChecksumMismatch` if the body digest is wrong, or
/// `Network` for any other read failure.
pub async fn read_packet<R>(reader: &mut R) -> Result<Packet, OpenDError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut header_buf = [0u8; HEADER_LEN];
    if let Err(e) = reader.read_exact(&mut header_buf).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Err(OpenDError::Closed);
        }
        return Err(e.into());
    }

    let header = PacketHeader::decode(&header_buf)?;
    let mut body = vec![0u8; header.body_len as usize];
    reader.read_exact(&mut body).await?;

    if body_sha1(&body) != header.body_sha1 {
        return Err(OpenDError::ChecksumMismatch {
            proto_id: header.proto_id,
            serial_no: header.serial_no,
        });
    }

    Ok(Packet { header, body })
}

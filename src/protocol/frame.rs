//! Notification frame encoding.
//!
//! Packs the command code, device token and payload into one length-prefixed
//! binary unit. Uses `bytes::BytesMut` so a batch can append many frames into
//! one contiguous buffer.
//!
//! # Example
//!
//! ```
//! use apns_wire::protocol::{encode_frame, Frame, COMMAND_SIMPLE};
//!
//! let bytes = encode_frame(COMMAND_SIMPLE, &[0xAB, 0xCD], b"{}").unwrap();
//! assert_eq!(&bytes[..], &[0, 0, 2, 0xAB, 0xCD, 0, 2, b'{', b'}']);
//!
//! let (frame, consumed) = Frame::decode(&bytes).unwrap();
//! assert_eq!(consumed, bytes.len());
//! assert_eq!(frame.payload(), b"{}");
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{FRAME_OVERHEAD, LENGTH_PREFIX_SIZE};
use crate::error::{ApnsError, Result};

/// A notification frame split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command code.
    pub command: u8,
    /// Device token bytes.
    pub token: Bytes,
    /// JSON payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from its fields.
    pub fn new(command: u8, token: Bytes, payload: Bytes) -> Self {
        Self {
            command,
            token,
            payload,
        }
    }

    /// Get a reference to the token bytes.
    #[inline]
    pub fn token(&self) -> &[u8] {
        &self.token
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Total encoded size of this frame.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.token.len() + self.payload.len()
    }

    /// Encode this frame.
    pub fn encode(&self) -> Result<Bytes> {
        encode_frame(self.command, &self.token, &self.payload)
    }

    /// Decode one frame from the front of `buf`.
    ///
    /// Returns the frame and the number of bytes it occupied, or `None` if
    /// `buf` does not hold a complete frame.
    pub fn decode(buf: &[u8]) -> Option<(Self, usize)> {
        let (&command, rest) = buf.split_first()?;
        let (token, rest) = split_prefixed(rest)?;
        let (payload, _) = split_prefixed(rest)?;

        let frame = Self {
            command,
            token: Bytes::copy_from_slice(token),
            payload: Bytes::copy_from_slice(payload),
        };
        let consumed = frame.encoded_len();
        Some((frame, consumed))
    }
}

/// Split a u16-length-prefixed field off the front of `buf`.
fn split_prefixed(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return None;
    }
    let len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    let rest = &buf[LENGTH_PREFIX_SIZE..];
    if rest.len() < len {
        return None;
    }
    Some(rest.split_at(len))
}

pub(super) fn prefix_len(field: &str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| {
        ApnsError::Protocol(format!(
            "{} length {} does not fit a 16-bit length prefix",
            field, len
        ))
    })
}

/// Build a complete frame as a single buffer.
///
/// # Errors
///
/// - `MissingToken` if `token` is empty
/// - `Protocol` if token or payload is longer than 65535 bytes
pub fn encode_frame(command: u8, token: &[u8], payload: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + token.len() + payload.len());
    encode_frame_into(&mut buf, command, token, payload)?;
    Ok(buf.freeze())
}

/// Append a complete frame to an existing buffer.
///
/// Nothing is written if validation fails.
pub fn encode_frame_into(
    buf: &mut BytesMut,
    command: u8,
    token: &[u8],
    payload: &[u8],
) -> Result<()> {
    if token.is_empty() {
        return Err(ApnsError::MissingToken);
    }
    let token_len = prefix_len("token", token.len())?;
    let payload_len = prefix_len("payload", payload.len())?;

    buf.reserve(FRAME_OVERHEAD + token.len() + payload.len());
    buf.put_u8(command);
    buf.put_u16(token_len);
    buf.put_slice(token);
    buf.put_u16(payload_len);
    buf.put_slice(payload);
    Ok(())
}

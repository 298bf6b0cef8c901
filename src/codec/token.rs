//! Device token normalization.
//!
//! Gateways address devices by an opaque fixed-length byte string. Clients
//! hand tokens around in three shapes, all of which normalize to the same
//! [`DeviceToken`]:
//!
//! - raw bytes
//! - standard base64 text
//! - hex text as printed by the device SDK (`<ab cd-ef ...>`)
//!
//! # Example
//!
//! ```
//! use apns_wire::codec::TokenCodec;
//!
//! let codec = TokenCodec::new(3);
//! let from_hex = codec.from_hex("<AB cd-ef>").unwrap();
//! let from_b64 = codec.from_base64("q83v").unwrap();
//! assert_eq!(from_hex, from_b64);
//! assert_eq!(from_hex.as_bytes(), &[0xAB, 0xCD, 0xEF]);
//! ```

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::{ApnsError, Result};
use crate::protocol::DEFAULT_TOKEN_LENGTH;

/// Canonical device token.
///
/// Immutable; cloning is cheap (`bytes::Bytes` underneath).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DeviceToken(Bytes);

impl DeviceToken {
    /// Get the token bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get a cheap clone of the token as Bytes.
    #[inline]
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }

    /// Token length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the token holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Standard base64 form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Short prefix for log lines.
    pub(crate) fn log_prefix(&self) -> String {
        hex_prefix(&self.0)
    }
}

/// First four bytes of a token as hex, for log lines.
pub(crate) fn hex_prefix(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(LOG_PREFIX_BYTES)])
}

const LOG_PREFIX_BYTES: usize = 4;

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceToken({})", self.to_hex())
    }
}

impl AsRef<[u8]> for DeviceToken {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Decoder for the three accepted token representations.
///
/// Every decoded token must be exactly `expected_len` bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCodec {
    expected_len: usize,
}

impl TokenCodec {
    /// Create a codec that accepts tokens of `expected_len` bytes.
    pub fn new(expected_len: usize) -> Self {
        Self { expected_len }
    }

    /// Expected token length in bytes.
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Accept raw token bytes.
    pub fn from_raw(&self, raw: &[u8]) -> Result<DeviceToken> {
        self.check_len(Bytes::copy_from_slice(raw))
    }

    /// Decode a standard base64 token.
    ///
    /// Surrounding whitespace is ignored.
    pub fn from_base64(&self, text: &str) -> Result<DeviceToken> {
        let raw = STANDARD
            .decode(text.trim())
            .map_err(|e| ApnsError::TokenFormat(format!("invalid base64: {}", e)))?;
        self.check_len(Bytes::from(raw))
    }

    /// Decode a hex token, case-insensitive.
    ///
    /// Surrounding whitespace and angle brackets are stripped, then every
    /// space and hyphen is removed before decoding.
    pub fn from_hex(&self, text: &str) -> Result<DeviceToken> {
        let raw = hex::decode(normalize_hex(text))
            .map_err(|e| ApnsError::TokenFormat(format!("invalid hex: {}", e)))?;
        self.check_len(Bytes::from(raw))
    }

    fn check_len(&self, raw: Bytes) -> Result<DeviceToken> {
        if raw.len() != self.expected_len {
            return Err(ApnsError::TokenFormat(format!(
                "token is {} bytes, expected {}",
                raw.len(),
                self.expected_len
            )));
        }
        Ok(DeviceToken(raw))
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

/// Strip the decoration device SDKs put around hex tokens.
pub fn normalize_hex(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '<' || c == '>')
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

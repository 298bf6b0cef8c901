//! Compact JSON codec using `serde_json`.
//!
//! Payloads go on the wire without insignificant whitespace, so every byte
//! counts against the gateway's payload limit. `serde_json::to_vec` already
//! produces the compact form; this wrapper adds the post-render size check.
//!
//! # Example
//!
//! ```
//! use apns_wire::codec::JsonCodec;
//! use serde_json::json;
//!
//! let encoded = JsonCodec::encode(&json!({"aps": {"badge": 0}})).unwrap();
//! assert_eq!(encoded, br#"{"aps":{"badge":0}}"#);
//! ```

use serde::Serialize;

use crate::error::{ApnsError, Result};

/// Compact JSON codec for payload documents.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Encode a value and reject the result if it exceeds `max_size` bytes.
    ///
    /// The limit applies to the rendered bytes, so it can only be checked
    /// after serialization.
    pub fn encode_with_limit<T: Serialize + ?Sized>(value: &T, max_size: usize) -> Result<Vec<u8>> {
        let encoded = Self::encode(value)?;
        if encoded.len() > max_size {
            return Err(ApnsError::PayloadTooLarge {
                size: encoded.len(),
                max: max_size,
            });
        }
        Ok(encoded)
    }
}

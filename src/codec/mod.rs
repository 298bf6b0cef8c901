//! Codec module - token normalization and payload serialization.
//!
//! - [`TokenCodec`] - Normalizes raw, base64 and hex device tokens
//! - [`JsonCodec`] - Compact JSON rendering with a post-render size limit
//!
//! # Example
//!
//! ```
//! use apns_wire::codec::{JsonCodec, TokenCodec};
//!
//! let token = TokenCodec::new(4).from_hex("<dead beef>").unwrap();
//! assert_eq!(token.to_hex(), "deadbeef");
//!
//! let encoded = JsonCodec::encode(&vec!["a", "b"]).unwrap();
//! assert_eq!(encoded, br#"["a","b"]"#);
//! ```

mod json;
mod token;

pub use json::JsonCodec;
pub use token::{normalize_hex, DeviceToken, TokenCodec};
pub(crate) use token::hex_prefix;

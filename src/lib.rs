//! # apns-wire
//!
//! Encoding core for the binary push-notification gateway protocol.
//!
//! This crate builds notification payloads, packs them into binary frames
//! and decodes the feedback stream of expired device tokens. Opening the
//! secured connection is left to the caller.
//!
//! ## Architecture
//!
//! - **Codec**: device token normalization, compact JSON rendering
//! - **Payload**: alert model, notification entity, size-checked payload builder
//! - **Protocol**: frame encoding, feedback record decoding
//! - **Batch**: ordered all-or-nothing encoding of many notifications
//! - **Transport**: endpoint selection and async channel adapters
//!
//! ## Example
//!
//! ```
//! use apns_wire::batch::NotificationBatch;
//! use apns_wire::codec::TokenCodec;
//! use apns_wire::payload::{Alert, Notification};
//!
//! let token = TokenCodec::default()
//!     .from_hex("<0123abcd 0123abcd 0123abcd 0123abcd 0123abcd 0123abcd 0123abcd 0123abcd>")
//!     .unwrap();
//!
//! let mut alert = Alert::new();
//! alert.loc_key("NEW_MESSAGE").loc_args(["Alice"]);
//!
//! let mut notification = Notification::new();
//! notification.token(token).alert(alert).badge(1).default_sound();
//!
//! let mut batch = NotificationBatch::new();
//! batch.append(notification).unwrap();
//!
//! let bytes = batch.encode_all().unwrap().into_bytes().unwrap();
//! assert_eq!(bytes[0], 0);
//! ```

pub mod batch;
pub mod codec;
pub mod error;
pub mod payload;
pub mod protocol;
pub mod transport;

pub use batch::{EncodedBatch, NotificationBatch};
pub use codec::{DeviceToken, TokenCodec};
pub use error::{ApnsError, Result};
pub use payload::{Alert, AlertContent, Notification, PayloadBuilder};
pub use protocol::{FeedbackDecoder, FeedbackRecord, Frame};

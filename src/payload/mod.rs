//! Payload module - alert model, notification entity and payload builder.
//!
//! Everything here is pure: rendering never touches the network and never
//! mutates its input.

mod alert;
mod notification;

pub use alert::{Alert, AlertContent};
pub use notification::{Notification, PayloadBuilder, DEFAULT_SOUND, RESERVED_KEY};

//! Ordered batch of pending notifications.
//!
//! A batch renders every notification (payload builder + frame encoder) in
//! insertion order and concatenates the frames into one outbound buffer.
//! Encoding is all-or-nothing: the first failing notification aborts the
//! batch and is reported by index, while the stored notifications stay
//! untouched so the caller can fix the entry and retry.
//!
//! # Example
//!
//! ```
//! use apns_wire::batch::{EncodedBatch, NotificationBatch};
//! use apns_wire::payload::Notification;
//!
//! let mut batch = NotificationBatch::new();
//! assert!(batch.encode_all().unwrap().is_empty());
//!
//! let mut notification = Notification::new();
//! notification.token_raw(&[0x42; 32]).unwrap().badge(3);
//! batch.append(notification).unwrap();
//!
//! match batch.encode_all().unwrap() {
//!     EncodedBatch::Frames { bytes, count } => {
//!         assert_eq!(count, 1);
//!         assert_eq!(bytes[0], 0);
//!     }
//!     EncodedBatch::Empty => unreachable!(),
//! }
//! ```

use bytes::{Bytes, BytesMut};

use crate::error::{ApnsError, Result};
use crate::payload::{Notification, PayloadBuilder};
use crate::protocol::{encode_frame_into, EncoderConfig};

/// Result of encoding a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedBatch {
    /// The batch held no notifications; nothing should be sent.
    Empty,
    /// Concatenated frames, in append order.
    Frames {
        /// Outbound bytes.
        bytes: Bytes,
        /// Number of frames in `bytes`.
        count: usize,
    },
}

impl EncodedBatch {
    /// Check whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        matches!(self, EncodedBatch::Empty)
    }

    /// Number of encoded frames.
    pub fn frame_count(&self) -> usize {
        match self {
            EncodedBatch::Empty => 0,
            EncodedBatch::Frames { count, .. } => *count,
        }
    }

    /// Consume into the outbound bytes, `None` when empty.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            EncodedBatch::Empty => None,
            EncodedBatch::Frames { bytes, .. } => Some(bytes),
        }
    }
}

/// Encode one notification into a complete frame.
///
/// # Errors
///
/// - `MissingToken` if the notification has no token
/// - `TokenFormat` if the token length differs from `config.token_length`
/// - `ReservedKeyConflict` / `PayloadTooLarge` from payload rendering
pub fn encode_notification(notification: &Notification, config: &EncoderConfig) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    encode_notification_into(&mut buf, notification, config)?;
    Ok(buf.freeze())
}

fn encode_notification_into(
    buf: &mut BytesMut,
    notification: &Notification,
    config: &EncoderConfig,
) -> Result<()> {
    let token = notification.get_token().ok_or(ApnsError::MissingToken)?;
    check_token_length(notification, config)?;

    let payload = PayloadBuilder::new(config.max_payload_size).build(notification)?;
    encode_frame_into(buf, config.command, token.as_bytes(), &payload)
}

fn check_token_length(notification: &Notification, config: &EncoderConfig) -> Result<()> {
    match notification.get_token() {
        Some(token) if token.len() != config.token_length => Err(ApnsError::TokenFormat(format!(
            "token is {} bytes, expected {}",
            token.len(),
            config.token_length
        ))),
        _ => Ok(()),
    }
}

/// Ordered collection of notifications sharing one [`EncoderConfig`].
///
/// Not internally synchronized; share behind a lock if several writers
/// need it.
#[derive(Debug, Clone, Default)]
pub struct NotificationBatch {
    notifications: Vec<Notification>,
    config: EncoderConfig,
}

impl NotificationBatch {
    /// Create an empty batch with default encoding parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty batch with custom encoding parameters.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            notifications: Vec::new(),
            config,
        }
    }

    /// Encoding parameters of this batch.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Append a notification.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNotification` if the notification carries a token
    /// whose length does not match the batch configuration. The batch is
    /// left unchanged.
    pub fn append(&mut self, notification: Notification) -> Result<()> {
        check_token_length(&notification, &self.config)
            .map_err(|e| ApnsError::InvalidNotification(e.to_string()))?;
        self.notifications.push(notification);
        Ok(())
    }

    /// Number of notifications in the batch.
    pub fn count(&self) -> usize {
        self.notifications.len()
    }

    /// Check if the batch holds no notifications.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Iterate over notifications in transmission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.notifications.iter()
    }

    /// Get a notification for in-place fixing.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Notification> {
        self.notifications.get_mut(index)
    }

    /// Remove and return the notification at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Notification> {
        if index < self.notifications.len() {
            Some(self.notifications.remove(index))
        } else {
            None
        }
    }

    /// Remove all notifications.
    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    /// Encode every notification, in append order, into one buffer.
    ///
    /// # Errors
    ///
    /// Returns `Batch { index, source }` for the first notification that
    /// fails; no partial output is produced.
    pub fn encode_all(&self) -> Result<EncodedBatch> {
        if self.notifications.is_empty() {
            return Ok(EncodedBatch::Empty);
        }

        let mut buf = BytesMut::new();
        for (index, notification) in self.notifications.iter().enumerate() {
            if let Err(e) = encode_notification_into(&mut buf, notification, &self.config) {
                let token = notification
                    .get_token()
                    .map(|t| t.log_prefix())
                    .unwrap_or_default();
                tracing::warn!(
                    "Notification {} (token {}...) failed to encode: {}",
                    index,
                    token,
                    e
                );
                return Err(ApnsError::Batch {
                    index,
                    source: Box::new(e),
                });
            }
        }

        tracing::debug!(
            "Encoded batch of {} notifications ({} bytes)",
            self.notifications.len(),
            buf.len()
        );

        Ok(EncodedBatch::Frames {
            bytes: buf.freeze(),
            count: self.notifications.len(),
        })
    }
}

impl<'a> IntoIterator for &'a NotificationBatch {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.notifications.iter()
    }
}

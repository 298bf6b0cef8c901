//! Error types for apns-wire.

use thiserror::Error;

/// Main error type for all encoding and decoding operations.
#[derive(Debug, Error)]
pub enum ApnsError {
    /// Device token could not be decoded or has the wrong length.
    #[error("Token format error: {0}")]
    TokenFormat(String),

    /// Frame encoding attempted without a device token.
    #[error("Device token is not set")]
    MissingToken,

    /// A field received a value of the wrong kind.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A notification failed structural validation.
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),

    /// A custom property uses the reserved top-level key.
    #[error("Custom property '{0}' collides with the reserved key")]
    ReservedKeyConflict(String),

    /// Serialized payload exceeds the configured maximum.
    #[error("Payload size {size} exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Feedback stream ended in the middle of a record.
    #[error("Truncated feedback stream: expected {expected} bytes, got {available}")]
    TruncatedStream { expected: usize, available: usize },

    /// Protocol error (field does not fit its length prefix, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// One notification of a batch failed to encode.
    #[error("Notification {index} failed to encode: {source}")]
    Batch {
        index: usize,
        #[source]
        source: Box<ApnsError>,
    },

    /// I/O error during channel operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ApnsError.
pub type Result<T> = std::result::Result<T, ApnsError>;

//! Wire format constants and fixed-size headers.
//!
//! Outbound notification frame (command 0):
//! ```text
//! ┌─────────┬───────────┬──────────┬─────────────┬──────────┐
//! │ Command │ Token len │ Token    │ Payload len │ Payload  │
//! │ 1 byte  │ uint16 BE │ N bytes  │ uint16 BE   │ M bytes  │
//! └─────────┴───────────┴──────────┴─────────────┴──────────┘
//! ```
//!
//! Feedback record, repeated until the stream ends:
//! ```text
//! ┌───────────┬───────────┬──────────┐
//! │ Timestamp │ Token len │ Token    │
//! │ uint32 BE │ uint16 BE │ N bytes  │
//! └───────────┴───────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

/// Command code of the simple notification frame.
pub const COMMAND_SIMPLE: u8 = 0;

/// Size of each length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Bytes a frame spends outside token and payload (command + two length prefixes).
pub const FRAME_OVERHEAD: usize = 1 + 2 * LENGTH_PREFIX_SIZE;

/// Default maximum serialized payload size in bytes.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 256;

/// Default canonical device token length in bytes.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Feedback record header size (timestamp + token length).
pub const FEEDBACK_HEADER_SIZE: usize = 6;

/// Encoding parameters shared by every notification of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Command code written as the first frame byte.
    pub command: u8,
    /// Maximum serialized payload size in bytes (inclusive).
    pub max_payload_size: usize,
    /// Required device token length in bytes.
    pub token_length: usize,
}

impl EncoderConfig {
    /// Set the command code.
    pub fn with_command(mut self, command: u8) -> Self {
        self.command = command;
        self
    }

    /// Set the maximum payload size.
    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }

    /// Set the required token length.
    pub fn with_token_length(mut self, token_length: usize) -> Self {
        self.token_length = token_length;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            command: COMMAND_SIMPLE,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            token_length: DEFAULT_TOKEN_LENGTH,
        }
    }
}

/// Decoded feedback record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackHeader {
    /// Unix time (seconds) the token was reported invalid.
    pub timestamp: u32,
    /// Length of the token that follows.
    pub token_length: u16,
}

impl FeedbackHeader {
    /// Create a new header.
    pub fn new(timestamp: u32, token_length: u16) -> Self {
        Self {
            timestamp,
            token_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; FEEDBACK_HEADER_SIZE] {
        let mut buf = [0u8; FEEDBACK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[4..6].copy_from_slice(&self.token_length.to_be_bytes());
        buf
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use apns_wire::protocol::FeedbackHeader;
    ///
    /// let bytes = [0x4B, 0x00, 0x00, 0x00, 0x00, 0x20];
    /// let header = FeedbackHeader::decode(&bytes).unwrap();
    /// assert_eq!(header.timestamp, 0x4B00_0000);
    /// assert_eq!(header.token_length, 32);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < FEEDBACK_HEADER_SIZE {
            return None;
        }
        Some(Self {
            timestamp: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            token_length: u16::from_be_bytes([buf[4], buf[5]]),
        })
    }
}

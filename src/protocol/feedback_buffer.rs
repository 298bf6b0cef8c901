//! Buffer for accumulating partial feedback reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented records:
//! - `WaitingForHeader`: Need at least 6 bytes
//! - `WaitingForToken`: Header parsed, need N more token bytes
//!
//! # Example
//!
//! ```
//! use apns_wire::protocol::{FeedbackBuffer, FeedbackRecord};
//!
//! let bytes = FeedbackRecord::new(1_300_000_000, vec![0xAA; 32]).encode().unwrap();
//!
//! let mut buffer = FeedbackBuffer::new();
//! assert!(buffer.push(&bytes[..10]).unwrap().is_empty());
//!
//! let records = buffer.push(&bytes[10..]).unwrap();
//! assert_eq!(records.len(), 1);
//! buffer.finish().unwrap();
//! ```

use bytes::BytesMut;

use super::feedback::FeedbackRecord;
use super::wire_format::{FeedbackHeader, FEEDBACK_HEADER_SIZE};
use crate::error::{ApnsError, Result};

/// State machine for record parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for complete header (need 6 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for token bytes.
    WaitingForToken { header: FeedbackHeader },
}

/// Buffer for accumulating incoming bytes and extracting complete records.
///
/// Suited to async reads where chunk boundaries fall anywhere inside a record.
#[derive(Debug)]
pub struct FeedbackBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum accepted token length, if any.
    max_token_length: Option<u16>,
}

impl FeedbackBuffer {
    /// Create a new feedback buffer accepting any token length.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4 * 1024),
            state: State::WaitingForHeader,
            max_token_length: None,
        }
    }

    /// Create a new feedback buffer rejecting tokens longer than `max`.
    pub fn with_max_token_length(max: u16) -> Self {
        Self {
            max_token_length: Some(max),
            ..Self::new()
        }
    }

    /// Push data into the buffer and extract all complete records.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// Returns `Protocol` error if a header announces a token longer than
    /// the configured maximum.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<FeedbackRecord>> {
        self.buffer.extend_from_slice(data);

        let mut records = Vec::new();
        while let Some(record) = self.try_extract_one()? {
            records.push(record);
        }
        Ok(records)
    }

    fn try_extract_one(&mut self) -> Result<Option<FeedbackRecord>> {
        match &self.state {
            State::WaitingForHeader => {
                let header = match FeedbackHeader::decode(&self.buffer) {
                    Some(header) => header,
                    None => return Ok(None),
                };

                if let Some(max) = self.max_token_length {
                    if header.token_length > max {
                        return Err(ApnsError::Protocol(format!(
                            "Feedback token length {} exceeds maximum {}",
                            header.token_length, max
                        )));
                    }
                }

                let _ = self.buffer.split_to(FEEDBACK_HEADER_SIZE);
                self.state = State::WaitingForToken { header };
                self.try_extract_one()
            }

            State::WaitingForToken { header } => {
                let len = header.token_length as usize;
                if self.buffer.len() < len {
                    return Ok(None);
                }

                let token = self.buffer.split_to(len).freeze();
                let timestamp = header.timestamp;
                self.state = State::WaitingForHeader;

                Ok(Some(FeedbackRecord::new(timestamp, token)))
            }
        }
    }

    /// Signal end of stream.
    ///
    /// # Errors
    ///
    /// Returns `TruncatedStream` if the stream stopped inside a record.
    pub fn finish(&self) -> Result<()> {
        match &self.state {
            State::WaitingForHeader if self.buffer.is_empty() => Ok(()),
            State::WaitingForHeader => Err(ApnsError::TruncatedStream {
                expected: FEEDBACK_HEADER_SIZE,
                available: self.buffer.len(),
            }),
            State::WaitingForToken { header } => Err(ApnsError::TruncatedStream {
                expected: header.token_length as usize,
                available: self.buffer.len(),
            }),
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForToken { .. } => "WaitingForToken",
        }
    }
}

impl Default for FeedbackBuffer {
    fn default() -> Self {
        Self::new()
    }
}

//! Feedback stream decoding.
//!
//! The feedback service reports device tokens that stopped accepting
//! notifications. The stream is a plain concatenation of records and ends
//! when the gateway closes the connection.
//!
//! [`FeedbackDecoder`] pulls records lazily from any [`std::io::Read`]
//! source. Records parsed before a truncation are still yielded; the
//! truncation shows up as the final `Err` item.
//!
//! # Example
//!
//! ```
//! use apns_wire::protocol::{FeedbackDecoder, FeedbackRecord};
//!
//! let mut stream = Vec::new();
//! stream.extend_from_slice(&FeedbackRecord::new(1, vec![0x01; 32]).encode().unwrap());
//! stream.extend_from_slice(&FeedbackRecord::new(2, vec![0x02; 32]).encode().unwrap());
//!
//! let records: Vec<_> = FeedbackDecoder::from_bytes(stream)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].timestamp, 2);
//! ```

use std::io::{self, Cursor, Read};
use std::iter::FusedIterator;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{BufMut, Bytes, BytesMut};

use super::frame::prefix_len;
use super::wire_format::{FeedbackHeader, FEEDBACK_HEADER_SIZE};
use crate::codec::hex_prefix;
use crate::error::{ApnsError, Result};

/// One expired-token report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// Unix time (seconds) the token was reported invalid.
    pub timestamp: u32,
    /// Device token bytes.
    pub token: Bytes,
}

impl FeedbackRecord {
    /// Create a new record.
    pub fn new(timestamp: u32, token: impl Into<Bytes>) -> Self {
        Self {
            timestamp,
            token: token.into(),
        }
    }

    /// Get a reference to the token bytes.
    #[inline]
    pub fn token(&self) -> &[u8] {
        &self.token
    }

    /// Token as lowercase hex.
    pub fn token_hex(&self) -> String {
        hex::encode(&self.token)
    }

    /// Point in time the token was reported invalid.
    pub fn reported_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.timestamp))
    }

    /// Short token prefix for log lines.
    pub(crate) fn log_prefix(&self) -> String {
        hex_prefix(&self.token)
    }

    /// Encode the record in its wire form.
    ///
    /// # Errors
    ///
    /// Returns `Protocol` error if the token is longer than 65535 bytes.
    pub fn encode(&self) -> Result<Bytes> {
        let token_length = prefix_len("token", self.token.len())?;
        let header = FeedbackHeader::new(self.timestamp, token_length);

        let mut buf = BytesMut::with_capacity(FEEDBACK_HEADER_SIZE + self.token.len());
        buf.put_slice(&header.encode());
        buf.put_slice(&self.token);
        Ok(buf.freeze())
    }
}

/// Lazy record iterator over a byte source.
///
/// Yields `Ok(record)` for every complete record in source order. Ends
/// cleanly when the source ends on a record boundary; otherwise the last
/// item is `Err(TruncatedStream)`. After any error the iterator is
/// exhausted. The source is consumed and cannot be rewound.
pub struct FeedbackDecoder<R> {
    reader: R,
    done: bool,
    records_read: usize,
}

impl<R: Read> FeedbackDecoder<R> {
    /// Create a decoder over a byte source.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
            records_read: 0,
        }
    }

    /// Number of complete records yielded so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Recover the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_record(&mut self) -> Result<Option<FeedbackRecord>> {
        let mut header_buf = [0u8; FEEDBACK_HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut header_buf)?;
        if n == 0 {
            return Ok(None);
        }
        if n < FEEDBACK_HEADER_SIZE {
            return Err(ApnsError::TruncatedStream {
                expected: FEEDBACK_HEADER_SIZE,
                available: n,
            });
        }

        let header = FeedbackHeader::decode(&header_buf).ok_or(ApnsError::TruncatedStream {
            expected: FEEDBACK_HEADER_SIZE,
            available: n,
        })?;

        let mut token = vec![0u8; header.token_length as usize];
        let n = read_full(&mut self.reader, &mut token)?;
        if n < token.len() {
            return Err(ApnsError::TruncatedStream {
                expected: token.len(),
                available: n,
            });
        }

        Ok(Some(FeedbackRecord::new(header.timestamp, token)))
    }
}

impl FeedbackDecoder<Cursor<Bytes>> {
    /// Create a decoder over an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }
}

impl<R: Read> Iterator for FeedbackDecoder<R> {
    type Item = Result<FeedbackRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => {
                self.records_read += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for FeedbackDecoder<R> {}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

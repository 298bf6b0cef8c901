//! Channel adapters over caller-provided byte streams.
//!
//! The crate never opens sockets or TLS sessions. Callers connect to the
//! endpoints from [`GatewayConfig`](super::GatewayConfig) however they like
//! and hand the resulting stream (anything implementing tokio's
//! `AsyncWrite` / `AsyncRead`) to these adapters.
//!
//! # Example
//!
//! ```ignore
//! use apns_wire::transport::{FeedbackChannel, NotificationChannel};
//!
//! let stream = connect_tls(config.gateway_addr()).await?;
//! let mut channel = NotificationChannel::new(stream);
//! if channel.notify(&batch).await? {
//!     batch.clear();
//! }
//! channel.close().await?;
//!
//! let stream = connect_tls(config.feedback_addr()).await?;
//! for record in FeedbackChannel::new(stream).receive().await? {
//!     forget_device(record.token_hex(), record.reported_at());
//! }
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::batch::{EncodedBatch, NotificationBatch};
use crate::error::Result;
use crate::protocol::{FeedbackBuffer, FeedbackRecord};

/// Read chunk size for the feedback stream.
const READ_BUFFER_SIZE: usize = 4 * 1024;

/// Write side: sends encoded batches to the notification gateway.
pub struct NotificationChannel<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> NotificationChannel<W> {
    /// Wrap a connected stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encode and send every notification of `batch` in one write.
    ///
    /// Returns `false` without writing anything when the batch is empty.
    /// An encoding failure is returned before any byte reaches the stream.
    pub async fn notify(&mut self, batch: &NotificationBatch) -> Result<bool> {
        let encoded = batch.encode_all()?;
        self.send(encoded).await
    }

    /// Send an already encoded batch.
    pub async fn send(&mut self, encoded: EncodedBatch) -> Result<bool> {
        let count = encoded.frame_count();
        let bytes = match encoded.into_bytes() {
            Some(bytes) => bytes,
            None => {
                tracing::debug!("Nothing to send, batch is empty");
                return Ok(false);
            }
        };

        self.writer.write_all(&bytes).await?;
        self.writer.flush().await?;

        tracing::debug!("Sent {} frames ({} bytes)", count, bytes.len());
        Ok(true)
    }

    /// Shut down the write side.
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Recover the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Read side: drains the feedback service.
pub struct FeedbackChannel<R> {
    reader: R,
    buffer: FeedbackBuffer,
}

impl<R: AsyncRead + Unpin> FeedbackChannel<R> {
    /// Wrap a connected stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: FeedbackBuffer::new(),
        }
    }

    /// Wrap a connected stream, rejecting tokens longer than `max`.
    pub fn with_max_token_length(reader: R, max: u16) -> Self {
        Self {
            reader,
            buffer: FeedbackBuffer::with_max_token_length(max),
        }
    }

    /// Read until the service closes the stream, handing each record to
    /// `on_record` as soon as it is complete.
    ///
    /// Returns the number of records delivered. Records delivered before a
    /// failure stay delivered.
    ///
    /// # Errors
    ///
    /// - `TruncatedStream` if the stream closed inside a record
    /// - `Protocol` if a record announces a token longer than the maximum
    /// - `Io` on read failure
    pub async fn receive_with<F>(&mut self, mut on_record: F) -> Result<usize>
    where
        F: FnMut(FeedbackRecord),
    {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut delivered = 0;

        loop {
            let n = self.reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            let records = match self.buffer.push(&buf[..n]) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("Feedback stream rejected: {}", e);
                    self.buffer.clear();
                    return Err(e);
                }
            };
            for record in records {
                tracing::debug!(
                    "Feedback: token {}... expired at {}",
                    record.log_prefix(),
                    record.timestamp
                );
                on_record(record);
                delivered += 1;
            }
        }

        if let Err(e) = self.buffer.finish() {
            tracing::warn!("Feedback stream ended mid-record: {}", e);
            self.buffer.clear();
            return Err(e);
        }

        tracing::debug!("Feedback stream closed after {} records", delivered);
        Ok(delivered)
    }

    /// Read until the service closes the stream and collect every record.
    pub async fn receive(&mut self) -> Result<Vec<FeedbackRecord>> {
        let mut records = Vec::new();
        self.receive_with(|record| records.push(record)).await?;
        Ok(records)
    }

    /// Recover the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApnsError;
    use crate::payload::Notification;
    use crate::protocol::Frame;
    use std::io::Cursor;
    use tokio::io::duplex;

    fn batch_of(count: u8) -> NotificationBatch {
        let mut batch = NotificationBatch::new();
        for i in 0..count {
            let mut n = Notification::new();
            n.token_raw(&[i; 32]).unwrap().alert(format!("message {}", i));
            batch.append(n).unwrap();
        }
        batch
    }

    fn feedback_stream(count: u32) -> Vec<u8> {
        let mut stream = Vec::new();
        for i in 0..count {
            stream.extend_from_slice(&FeedbackRecord::new(i, vec![i as u8; 32]).encode().unwrap());
        }
        stream
    }

    #[tokio::test]
    async fn test_notify_writes_all_frames() {
        let mut channel = NotificationChannel::new(Cursor::new(Vec::new()));
        let batch = batch_of(3);

        assert!(channel.notify(&batch).await.unwrap());

        let written = channel.into_inner().into_inner();
        let expected = batch.encode_all().unwrap().into_bytes().unwrap();
        assert_eq!(written, expected.to_vec());

        let (first, _) = Frame::decode(&written).unwrap();
        assert_eq!(first.payload(), br#"{"aps":{"alert":"message 0"}}"#);
    }

    #[tokio::test]
    async fn test_notify_empty_batch_writes_nothing() {
        let mut channel = NotificationChannel::new(Cursor::new(Vec::new()));

        assert!(!channel.notify(&NotificationBatch::new()).await.unwrap());
        assert!(channel.into_inner().into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_notify_encoding_failure_writes_nothing() {
        let mut channel = NotificationChannel::new(Cursor::new(Vec::new()));
        let mut batch = batch_of(2);
        batch.append(Notification::new()).unwrap();

        let result = channel.notify(&batch).await;
        assert!(matches!(result, Err(ApnsError::Batch { index: 2, .. })));
        assert!(channel.into_inner().into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_notify_over_duplex() {
        let (client, mut server) = duplex(64 * 1024);
        let mut channel = NotificationChannel::new(client);
        let batch = batch_of(2);

        channel.notify(&batch).await.unwrap();
        channel.close().await.unwrap();

        let mut received = Vec::new();
        server.read_to_end(&mut received).await.unwrap();

        let (first, used) = Frame::decode(&received).unwrap();
        let (second, _) = Frame::decode(&received[used..]).unwrap();
        assert_eq!(first.token(), &[0; 32]);
        assert_eq!(second.token(), &[1; 32]);
    }

    #[tokio::test]
    async fn test_receive_all_records() {
        let mut channel = FeedbackChannel::new(Cursor::new(feedback_stream(4)));
        let records = channel.receive().await.unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[3].timestamp, 3);
        assert_eq!(records[3].token(), &[3; 32]);
    }

    #[tokio::test]
    async fn test_receive_across_chunked_writes() {
        let (mut server, client) = duplex(16);
        let stream = feedback_stream(3);

        let writer = tokio::spawn(async move {
            for chunk in stream.chunks(5) {
                server.write_all(chunk).await.unwrap();
            }
        });

        let mut channel = FeedbackChannel::new(client);
        let records = channel.receive().await.unwrap();
        writer.await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].timestamp, 1);
    }

    #[tokio::test]
    async fn test_receive_with_keeps_records_before_truncation() {
        let mut stream = feedback_stream(3);
        stream.truncate(stream.len() - 1);

        let mut channel = FeedbackChannel::new(Cursor::new(stream));
        let mut seen = Vec::new();
        let result = channel.receive_with(|r| seen.push(r.timestamp)).await;

        assert!(matches!(result, Err(ApnsError::TruncatedStream { .. })));
        assert_eq!(seen, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_receive_rejects_oversized_token() {
        let stream = FeedbackRecord::new(1, vec![0u8; 100]).encode().unwrap().to_vec();
        let mut channel = FeedbackChannel::with_max_token_length(Cursor::new(stream), 32);

        let result = channel.receive().await;
        assert!(matches!(result, Err(ApnsError::Protocol(_))));
        assert!(channel.buffer.is_empty());
    }

    #[tokio::test]
    async fn test_channel_reusable_after_rejected_record() {
        let mut stream = FeedbackRecord::new(1, vec![0u8; 100]).encode().unwrap().to_vec();
        stream.extend_from_slice(&FeedbackRecord::new(2, vec![0u8; 32]).encode().unwrap());
        let mut channel = FeedbackChannel::with_max_token_length(Cursor::new(stream), 32);
        assert!(channel.receive().await.is_err());

        let (mut tx, rx) = duplex(256);
        let mut channel = FeedbackChannel {
            reader: rx,
            buffer: channel.buffer,
        };
        tx.write_all(&FeedbackRecord::new(3, vec![9u8; 32]).encode().unwrap())
            .await
            .unwrap();
        drop(tx);

        let records = channel.receive().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, 3);
    }
}

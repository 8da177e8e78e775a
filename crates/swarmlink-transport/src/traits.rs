use async_trait::async_trait;
use bytes::BytesMut;
use tokio_util::codec::Encoder;

use crate::codec::LineCodec;
use crate::error::Result;

/// A line-framed byte channel to the remote board.
///
/// This is the fundamental I/O contract everything above builds on. It is
/// object safe so the multiplexer can own a `Box<dyn LineTransport>` without
/// caring whether the bytes travel over a serial port or an in-memory pipe.
#[async_trait]
pub trait LineTransport: Send {
    /// Write raw bytes and flush.
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read the next complete line, without its CR/LF terminator.
    ///
    /// Must be cancel safe: dropping the future keeps partially received
    /// bytes buffered for the next call.
    async fn read_line(&mut self) -> Result<String>;

    /// Whether at least one byte can be read without waiting.
    async fn bytes_available(&mut self) -> Result<bool>;

    /// Drop everything currently buffered or immediately readable.
    ///
    /// Returns the number of bytes discarded.
    async fn discard_buffered(&mut self) -> Result<usize>;

    /// Close the channel. Subsequent operations fail with `Closed`.
    async fn close(&mut self) -> Result<()>;

    /// Whether the channel has been closed locally or by the peer.
    fn is_closed(&self) -> bool;

    /// Write `line` followed by the CR/LF terminator.
    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut buf = BytesMut::new();
        LineCodec::new().encode(line, &mut buf)?;
        self.write(&buf).await
    }
}

use std::future::poll_fn;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::codec::LineCodec;
use crate::error::{Result, TransportError};
use crate::traits::LineTransport;

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Line transport over any async byte stream.
///
/// Wraps serial ports, `tokio::io::duplex` pipes in tests, or anything else
/// that is `AsyncRead + AsyncWrite`. Bytes move from the stream into an
/// internal buffer only when a read completes, so every read future is
/// cancel safe.
pub struct StreamTransport<T> {
    inner: T,
    buf: BytesMut,
    codec: LineCodec,
    closed: bool,
}

impl<T> StreamTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a stream using the default line codec.
    pub fn new(inner: T) -> Self {
        Self::with_codec(inner, LineCodec::new())
    }

    /// Wrap a stream using an explicit line codec.
    pub fn with_codec(inner: T, codec: LineCodec) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            codec,
            closed: false,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Number of received bytes not yet consumed as lines.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }

    fn poll_fill(&mut self, cx: &mut Context<'_>) -> Poll<std::io::Result<usize>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let mut read_buf = ReadBuf::new(&mut chunk);
        match Pin::new(&mut self.inner).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                self.buf.extend_from_slice(filled);
                Poll::Ready(Ok(filled.len()))
            }
            Poll::Ready(Err(err)) => Poll::Ready(Err(err)),
            Poll::Pending => Poll::Pending,
        }
    }

    /// Wait until more bytes arrive. Returns the number of bytes read.
    async fn fill(&mut self) -> Result<usize> {
        loop {
            match poll_fn(|cx| self.poll_fill(cx)).await {
                Ok(0) => return Err(self.mark_closed()),
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.fail(err)),
            }
        }
    }

    /// Attempt one read without waiting. `None` means nothing was ready.
    async fn try_fill_now(&mut self) -> Result<Option<usize>> {
        match poll_fn(|cx| Poll::Ready(self.poll_fill(cx))).await {
            Poll::Ready(Ok(0)) => Err(self.mark_closed()),
            Poll::Ready(Ok(n)) => Ok(Some(n)),
            Poll::Ready(Err(err))
                if err.kind() == ErrorKind::Interrupted || err.kind() == ErrorKind::WouldBlock =>
            {
                Ok(None)
            }
            Poll::Ready(Err(err)) => Err(self.fail(err)),
            Poll::Pending => Ok(None),
        }
    }

    fn mark_closed(&mut self) -> TransportError {
        if !self.closed {
            debug!("stream reached end of file");
        }
        self.closed = true;
        TransportError::Closed
    }

    fn fail(&mut self, err: std::io::Error) -> TransportError {
        let err = TransportError::Io(err);
        if err.is_closed() {
            self.mark_closed()
        } else {
            err
        }
    }
}

#[async_trait]
impl<T> LineTransport for StreamTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if let Err(err) = self.inner.write_all(bytes).await {
            return Err(self.fail(err));
        }
        if let Err(err) = self.inner.flush().await {
            return Err(self.fail(err));
        }
        trace!(len = bytes.len(), "wrote bytes");
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        self.ensure_open()?;
        loop {
            if let Some(line) = self.codec.decode(&mut self.buf)? {
                return Ok(line);
            }
            self.fill().await?;
        }
    }

    async fn bytes_available(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if !self.buf.is_empty() {
            return Ok(true);
        }
        Ok(self.try_fill_now().await?.is_some())
    }

    async fn discard_buffered(&mut self) -> Result<usize> {
        self.ensure_open()?;
        let mut discarded = self.buf.len();
        self.buf.clear();
        self.codec.reset();

        while let Some(n) = self.try_fill_now().await? {
            discarded += n;
            self.buf.clear();
        }

        if discarded > 0 {
            debug!(discarded, "discarded buffered input");
        }
        Ok(discarded)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buf.clear();
        self.codec.reset();
        match self.inner.shutdown().await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> std::fmt::Debug for StreamTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("buffered", &self.buf.len())
            .field("closed", &self.closed)
            .finish()
    }
}

use std::path::PathBuf;

/// Errors that can occur in line transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: tokio_serial::Error,
    },

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream, or the transport was closed locally.
    #[error("transport closed")]
    Closed,

    /// More bytes arrived without a line terminator than the codec allows.
    #[error("line too long ({len} bytes without terminator, max {max})")]
    LineTooLong { len: usize, max: usize },
}

impl TransportError {
    /// Whether this error means the connection is gone for good.
    pub fn is_closed(&self) -> bool {
        match self {
            TransportError::Closed => true,
            TransportError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

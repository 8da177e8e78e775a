//! Line-framed transport abstraction.
//!
//! Provides a unified line interface over byte streams:
//! - Serial ports (via `tokio-serial`)
//! - Any other `AsyncRead + AsyncWrite` (in-memory pipes, sockets)
//!
//! This is the lowest layer of swarmlink. Everything else builds on top of
//! the [`LineTransport`] trait provided here.

pub mod codec;
pub mod error;
pub mod serial;
pub mod stream;
pub mod traits;

pub use codec::{LineCodec, DEFAULT_MAX_LINE_LENGTH, LINE_TERMINATOR};
pub use error::{Result, TransportError};
pub use serial::{open_serial, SerialConfig, DEFAULT_BAUD_RATE};
pub use stream::StreamTransport;
pub use traits::LineTransport;

pub use tokio_serial::{
    DataBits, ErrorKind as SerialErrorKind, FlowControl, Parity, SerialStream, StopBits,
};

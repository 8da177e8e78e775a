//! One multiplexed link to an ftSwarm board.
//!
//! Owns the line transport, serializes request/reply exchanges through a
//! single exclusive section and queues the notifications that arrive in
//! between. Also carries the bring-up handshake and the connection state
//! machine.

pub mod config;
pub mod connector;
pub mod error;
pub mod handshake;
pub mod multiplexer;
pub mod state;

pub use config::{
    LinkConfig, DEFAULT_LINE_READ_TIMEOUT, DEFAULT_MAX_PENDING_NOTIFICATIONS,
    DEFAULT_REPLY_TIMEOUT,
};
pub use connector::{attach, connect, connect_with_config};
pub use error::{LinkError, Result};
pub use handshake::{
    bring_up, HandshakeConfig, HandshakeResult, DEFAULT_BANNER_MARKER, DEFAULT_RESET_COMMAND,
};
pub use multiplexer::Multiplexer;
pub use state::LinkState;

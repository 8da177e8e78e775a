use swarmlink_link::LinkError;
use swarmlink_wire::WireError;

/// Errors surfaced by the device layer.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    /// Link-level error (transport, timeout, state).
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Invalid command or undecodable reply value.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// The port is already registered as a different device type.
    #[error("port {port} already holds a {existing}")]
    KindMismatch { port: String, existing: &'static str },

    /// A reply was missing or had the wrong shape.
    #[error("unexpected reply to {command}: {}", .reply.as_deref().unwrap_or("<none>"))]
    UnexpectedReply {
        command: String,
        reply: Option<String>,
    },

    /// I2C register index out of range.
    #[error("register {0} out of range (0..{max})", max = crate::device::i2c::REGISTER_COUNT)]
    InvalidRegister(u8),

    /// The device on this port does not offer the operation.
    #[error("{kind} on {port} does not support {operation}")]
    Unsupported {
        port: String,
        kind: &'static str,
        operation: &'static str,
    },

    /// The background poller task panicked or was cancelled.
    #[error("poller task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SwarmError>;

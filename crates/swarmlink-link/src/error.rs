use crate::state::LinkState;

/// Errors that can occur on a multiplexed link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] swarmlink_transport::TransportError),

    /// Malformed command or reply value.
    #[error("wire error: {0}")]
    Wire(#[from] swarmlink_wire::WireError),

    /// Bring-up did not reach the boot banner.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// No reply (or banner) arrived in time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The operation is not allowed in the current connection state.
    #[error("cannot {operation} while link is {state}")]
    InvalidState {
        state: LinkState,
        operation: &'static str,
    },

    /// The link is closed. Terminal: there is no reconnection.
    #[error("link closed")]
    Closed,
}

impl LinkError {
    /// Whether the link is gone for good after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            LinkError::Closed => true,
            LinkError::Transport(err) => err.is_closed(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

use std::fmt;

use serde::Serialize;

/// Lifecycle of a link: `Uninitialized → Handshaking → Ready → Closed`.
///
/// `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Uninitialized,
    Handshaking,
    Ready,
    Closed,
}

impl LinkState {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkState::Uninitialized => "uninitialized",
            LinkState::Handshaking => "handshaking",
            LinkState::Ready => "ready",
            LinkState::Closed => "closed",
        }
    }

    /// Whether `self → next` is an edge of the state machine.
    pub fn can_transition_to(self, next: LinkState) -> bool {
        matches!(
            (self, next),
            (LinkState::Uninitialized, LinkState::Handshaking)
                | (LinkState::Uninitialized, LinkState::Ready)
                | (LinkState::Handshaking, LinkState::Ready)
                | (_, LinkState::Closed)
        ) && self != LinkState::Closed
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_is_terminal() {
        for next in [
            LinkState::Uninitialized,
            LinkState::Handshaking,
            LinkState::Ready,
            LinkState::Closed,
        ] {
            assert!(!LinkState::Closed.can_transition_to(next));
        }
    }

    #[test]
    fn forward_edges_only() {
        assert!(LinkState::Uninitialized.can_transition_to(LinkState::Handshaking));
        assert!(LinkState::Handshaking.can_transition_to(LinkState::Ready));
        assert!(LinkState::Ready.can_transition_to(LinkState::Closed));
        assert!(!LinkState::Ready.can_transition_to(LinkState::Handshaking));
        assert!(!LinkState::Handshaking.can_transition_to(LinkState::Uninitialized));
    }
}

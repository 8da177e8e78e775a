use std::time::Duration;

use swarmlink_link::{HandshakeConfig, LinkConfig};
use swarmlink_transport::SerialConfig;

/// Default pause between two notification polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Everything needed to bring up a `Swarm`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmConfig {
    pub serial: SerialConfig,
    pub link: LinkConfig,
    /// Bring-up sequence; `None` skips the board reset.
    pub handshake: Option<HandshakeConfig>,
    pub poll_interval: Duration,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            link: LinkConfig::default(),
            handshake: Some(HandshakeConfig::default()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SwarmConfig {
    /// Defaults for the board on `path`.
    pub fn serial(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            serial: SerialConfig::new(path),
            ..Self::default()
        }
    }

    pub fn with_link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    pub fn with_handshake(mut self, handshake: Option<HandshakeConfig>) -> Self {
        self.handshake = handshake;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

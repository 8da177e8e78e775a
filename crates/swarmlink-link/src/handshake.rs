use std::time::Duration;

use swarmlink_transport::{LineTransport, TransportError};
use tracing::{debug, info, warn};

use crate::error::{LinkError, Result};

/// Command that restarts the firmware into its CLI.
pub const DEFAULT_RESET_COMMAND: &str = "reload";

/// Substring of the line the firmware prints once its CLI accepts commands.
pub const DEFAULT_BANNER_MARKER: &str = "@@@ ftSwarmOS CLI started";

/// Configuration for bring-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Line written to restart the board.
    pub reset_command: String,
    /// Bring-up completes on the first line containing this marker.
    pub banner_marker: String,
    /// Upper bound on the whole bring-up sequence.
    pub timeout: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            reset_command: DEFAULT_RESET_COMMAND.to_string(),
            banner_marker: DEFAULT_BANNER_MARKER.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl HandshakeConfig {
    pub fn with_banner_marker(mut self, marker: impl Into<String>) -> Self {
        self.banner_marker = marker.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What bring-up observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResult {
    /// The banner line itself.
    pub banner: String,
    /// Lines printed before the banner.
    pub lines_skipped: usize,
    /// Bytes dropped after the banner.
    pub discarded_bytes: usize,
}

/// Reset the board and wait for its CLI banner.
///
/// Writes the reset command, scans lines until one contains the banner
/// marker, then throws away whatever else is already buffered so the first
/// real command starts from a clean stream.
pub async fn bring_up(
    transport: &mut dyn LineTransport,
    config: &HandshakeConfig,
) -> Result<HandshakeResult> {
    if config.banner_marker.is_empty() {
        return Err(LinkError::HandshakeFailed(
            "banner marker must not be empty".to_string(),
        ));
    }

    match tokio::time::timeout(config.timeout, scan_for_banner(transport, config)).await {
        Ok(result) => result,
        Err(_) => Err(LinkError::Timeout(config.timeout)),
    }
}

async fn scan_for_banner(
    transport: &mut dyn LineTransport,
    config: &HandshakeConfig,
) -> Result<HandshakeResult> {
    transport
        .write_line(&config.reset_command)
        .await
        .map_err(disconnected)?;
    debug!(command = %config.reset_command, "sent reset command");

    let mut lines_skipped = 0usize;
    loop {
        let line = match transport.read_line().await {
            Ok(line) => line,
            Err(TransportError::LineTooLong { len, .. }) => {
                warn!(len, "skipping overlong boot output");
                continue;
            }
            Err(err) => return Err(disconnected(err)),
        };

        debug!("- {line}");
        if line.contains(&config.banner_marker) {
            let discarded_bytes = transport.discard_buffered().await.map_err(disconnected)?;
            info!(lines_skipped, "board CLI started");
            return Ok(HandshakeResult {
                banner: line,
                lines_skipped,
                discarded_bytes,
            });
        }
        lines_skipped += 1;
    }
}

fn disconnected(err: TransportError) -> LinkError {
    if err.is_closed() {
        LinkError::HandshakeFailed("connection closed during bring-up".to_string())
    } else {
        LinkError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use swarmlink_transport::StreamTransport;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader};

    use super::*;

    #[tokio::test]
    async fn completes_on_banner_and_discards_rest() {
        let (board, host) = duplex(1024);
        let mut board = BufReader::new(board);
        let mut transport = StreamTransport::new(host);

        board
            .get_mut()
            .write_all(b"ets Jun  8 2016\r\nbooting\r\n@@@ ftSwarmOS CLI started\r\n> leftover")
            .await
            .unwrap();

        let result = bring_up(&mut transport, &HandshakeConfig::default())
            .await
            .unwrap();

        assert_eq!(result.banner, "@@@ ftSwarmOS CLI started");
        assert_eq!(result.lines_skipped, 2);
        assert_eq!(result.discarded_bytes, "> leftover".len());
        assert!(!transport.bytes_available().await.unwrap());

        let mut sent = String::new();
        board.read_line(&mut sent).await.unwrap();
        assert_eq!(sent, "reload\r\n");
    }

    #[tokio::test]
    async fn custom_marker_matches_substring() {
        let (mut board, host) = duplex(1024);
        let mut transport = StreamTransport::new(host);
        board.write_all(b"@@@ boot banner\r\n").await.unwrap();

        let cfg = HandshakeConfig::default().with_banner_marker("@@@ boot banner");
        let result = bring_up(&mut transport, &cfg).await.unwrap();
        assert_eq!(result.lines_skipped, 0);
    }

    #[tokio::test]
    async fn times_out_without_banner() {
        let (mut board, host) = duplex(1024);
        let mut transport = StreamTransport::new(host);
        board.write_all(b"still booting\r\n").await.unwrap();

        let cfg = HandshakeConfig::default().with_timeout(Duration::from_millis(30));
        let err = bring_up(&mut transport, &cfg).await.unwrap_err();
        assert!(matches!(err, LinkError::Timeout(_)));
    }

    #[tokio::test]
    async fn eof_fails_handshake() {
        let (board, host) = duplex(1024);
        let mut transport = StreamTransport::new(host);
        drop(board);

        let err = bring_up(&mut transport, &HandshakeConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::HandshakeFailed(_)));
    }

    #[tokio::test]
    async fn rejects_empty_marker() {
        let (_board, host) = duplex(64);
        let mut transport = StreamTransport::new(host);
        let cfg = HandshakeConfig::default().with_banner_marker("");
        let err = bring_up(&mut transport, &cfg).await.unwrap_err();
        assert!(matches!(err, LinkError::HandshakeFailed(_)));
    }
}

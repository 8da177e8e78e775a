use swarmlink_transport::{open_serial, LineTransport, SerialConfig};

use crate::config::LinkConfig;
use crate::error::Result;
use crate::handshake::HandshakeConfig;
use crate::multiplexer::Multiplexer;

/// Open the serial port, reset the board and wait until it is `Ready`.
pub async fn connect(serial: &SerialConfig) -> Result<Multiplexer> {
    connect_with_config(serial, LinkConfig::default(), Some(&HandshakeConfig::default())).await
}

/// Open the serial port with explicit configuration.
///
/// With `handshake: None` the board is assumed to be in CLI mode already.
pub async fn connect_with_config(
    serial: &SerialConfig,
    link: LinkConfig,
    handshake: Option<&HandshakeConfig>,
) -> Result<Multiplexer> {
    let transport = open_serial(serial)?;
    attach(Box::new(transport), link, handshake).await
}

/// Bring up a link over an already open transport.
pub async fn attach(
    transport: Box<dyn LineTransport>,
    link: LinkConfig,
    handshake: Option<&HandshakeConfig>,
) -> Result<Multiplexer> {
    let mux = Multiplexer::new(transport, link);
    match handshake {
        Some(config) => {
            mux.handshake(config).await?;
        }
        None => mux.skip_handshake().await?,
    }
    Ok(mux)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use swarmlink_transport::{StreamTransport, TransportError};
    use tokio::io::{duplex, AsyncWriteExt};

    use super::*;
    use crate::error::LinkError;
    use crate::state::LinkState;

    #[tokio::test]
    async fn attach_without_handshake_is_ready() {
        let (_board, host) = duplex(256);
        let mux = attach(Box::new(StreamTransport::new(host)), LinkConfig::default(), None)
            .await
            .unwrap();
        assert_eq!(mux.state(), LinkState::Ready);
    }

    #[tokio::test]
    async fn attach_runs_handshake() {
        let (mut board, host) = duplex(256);
        board.write_all(b"@@@ ftSwarmOS CLI started\r\n").await.unwrap();

        let config = HandshakeConfig::default().with_timeout(Duration::from_secs(1));
        let mux = attach(
            Box::new(StreamTransport::new(host)),
            LinkConfig::default(),
            Some(&config),
        )
        .await
        .unwrap();
        assert_eq!(mux.state(), LinkState::Ready);
    }

    #[tokio::test]
    async fn connect_reports_missing_port() {
        let serial = SerialConfig::new("/dev/swarmlink-does-not-exist");
        let err = connect(&serial).await.unwrap_err();
        assert!(matches!(
            err,
            LinkError::Transport(TransportError::Open { .. })
        ));
    }
}

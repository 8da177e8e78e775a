//! In-memory board for unit tests.

use std::sync::Arc;

use swarmlink_link::{LinkConfig, Multiplexer};
use swarmlink_transport::StreamTransport;
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use crate::device::DeviceCore;

/// The far end of the serial line.
pub(crate) struct Board {
    io: BufReader<DuplexStream>,
}

impl Board {
    pub(crate) async fn expect_line(&mut self) -> String {
        let mut line = String::new();
        self.io.read_line(&mut line).await.unwrap();
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    pub(crate) async fn say(&mut self, text: &str) {
        self.io.get_mut().write_all(text.as_bytes()).await.unwrap();
    }
}

pub(crate) async fn ready_link() -> (Arc<Multiplexer>, Board) {
    let (board, host) = duplex(4096);
    let link = Multiplexer::new(Box::new(StreamTransport::new(host)), LinkConfig::default());
    link.skip_handshake().await.unwrap();
    (
        Arc::new(link),
        Board {
            io: BufReader::new(board),
        },
    )
}

pub(crate) async fn core(port: &str) -> (DeviceCore, Board) {
    let (link, board) = ready_link().await;
    (DeviceCore::new(port, link), board)
}

use std::time::Duration;

use swarmlink_devices::{Swarm, SwarmConfig};
use swarmlink_link::{HandshakeConfig, LinkState};
use swarmlink_transport::StreamTransport;
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

struct Board {
    io: BufReader<DuplexStream>,
}

impl Board {
    async fn expect_line(&mut self) -> String {
        let mut line = String::new();
        self.io.read_line(&mut line).await.unwrap();
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    async fn say(&mut self, text: &str) {
        self.io.get_mut().write_all(text.as_bytes()).await.unwrap();
    }
}

fn config() -> SwarmConfig {
    SwarmConfig::default()
        .with_handshake(Some(
            HandshakeConfig::default().with_banner_marker("@@@ boot banner"),
        ))
        .with_poll_interval(Duration::from_millis(10))
}

async fn boot() -> (Swarm, Board) {
    let (board, host) = duplex(4096);
    let mut board = Board {
        io: BufReader::new(board),
    };

    let transport = Box::new(StreamTransport::new(host));
    let connecting = tokio::spawn(async move { Swarm::with_transport(transport, &config()).await });

    assert_eq!(board.expect_line().await, "reload");
    board.say("ets boot noise\r\n@@@ boot banner\r\n").await;

    let swarm = timeout(WAIT, connecting)
        .await
        .expect("handshake should finish")
        .unwrap()
        .unwrap();
    (swarm, board)
}

#[tokio::test]
async fn digital_input_follows_pushed_state() {
    let (swarm, mut board) = boot().await;
    assert_eq!(swarm.state(), LinkState::Ready);

    let requesting = {
        let swarm = swarm.clone();
        tokio::spawn(async move { swarm.digital_input("A1").await })
    };

    assert_eq!(board.expect_line().await, "A1.setSensorType(0,true)");
    board.say("R: \r\n").await;
    assert_eq!(board.expect_line().await, "A1.subscribe(0)");
    assert_eq!(board.expect_line().await, "A1.getValue()");
    board.say("R: \r\n").await;

    let input = timeout(WAIT, requesting)
        .await
        .expect("device should register")
        .unwrap()
        .unwrap();
    assert!(input.is_released());

    // Both setup replies were consumed by setup itself.
    let toggled = {
        let input = input.clone();
        tokio::spawn(async move { input.has_toggled_up().await })
    };
    assert_eq!(board.expect_line().await, "A1.getToggle()");
    board.say("R: 1\r\n").await;
    assert!(toggled.await.unwrap().unwrap());

    let mut changes = input.subscribe();
    board.say("S: A1 1\r\n").await;
    timeout(WAIT, changes.wait_for(|value| *value == 1))
        .await
        .expect("notification should be routed")
        .unwrap();
    assert!(input.is_pressed());

    swarm.close().await.unwrap();
    assert_eq!(swarm.state(), LinkState::Closed);
}

#[tokio::test]
async fn second_request_reuses_the_device() {
    let (swarm, mut board) = boot().await;

    let requesting = {
        let swarm = swarm.clone();
        tokio::spawn(async move { swarm.digital_input("A2").await })
    };
    assert_eq!(board.expect_line().await, "A2.setSensorType(0,true)");
    board.say("R: \r\n").await;
    assert_eq!(board.expect_line().await, "A2.subscribe(0)");
    assert_eq!(board.expect_line().await, "A2.getValue()");
    board.say("R: 1\r\n").await;
    let first = requesting.await.unwrap().unwrap();
    assert!(first.is_pressed());

    let second = timeout(WAIT, swarm.digital_input("A2"))
        .await
        .expect("cached device should come back at once")
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(swarm.device_count().await, 1);

    swarm.close().await.unwrap();
}

#[tokio::test]
async fn unknown_ports_and_noise_are_ignored() {
    let (swarm, mut board) = boot().await;

    board.say("S: Z9 4\r\ngarbage\r\n").await;
    swarm.route_notification("S: Q1 1").await;

    let motor = {
        let swarm = swarm.clone();
        tokio::spawn(async move { swarm.motor("M1", false).await })
    };
    assert_eq!(board.expect_line().await, "M1.setActorType(0,false)");
    board.say("R: \r\n").await;
    let motor = motor.await.unwrap().unwrap();

    let speed = {
        let motor = motor.clone();
        tokio::spawn(async move { motor.speed().await })
    };
    assert_eq!(board.expect_line().await, "M1.getSpeed()");
    board.say("R: 30\r\n").await;
    assert_eq!(speed.await.unwrap().unwrap(), 30);

    assert_eq!(swarm.state(), LinkState::Ready);
    swarm.close().await.unwrap();
}

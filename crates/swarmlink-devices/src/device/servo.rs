use async_trait::async_trait;
use swarmlink_wire::args;

use super::{Device, DeviceCore};
use crate::error::Result;

/// Hobby servo on an ftSwarm. Position and offset live on the board.
#[derive(Debug)]
pub struct Servo {
    core: DeviceCore,
}

impl Servo {
    pub fn new(core: DeviceCore) -> Self {
        Self { core }
    }

    pub async fn position(&self) -> Result<i64> {
        self.core.query_int("getPosition", args![]).await
    }

    pub async fn set_position(&self, position: i64) -> Result<()> {
        self.core.execute("setPosition", args![position]).await
    }

    pub async fn offset(&self) -> Result<i64> {
        self.core.query_int("getOffset", args![]).await
    }

    pub async fn set_offset(&self, offset: i64) -> Result<()> {
        self.core.execute("setOffset", args![offset]).await
    }
}

#[async_trait]
impl Device for Servo {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        "servo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn getters_read_the_board() {
        let (core, mut board) = testing::core("SERVO").await;
        let servo = Servo::new(core);

        board.say("R: \r\nR: 45\r\nR: -3\r\n").await;
        servo.set_position(90).await.unwrap();
        assert_eq!(servo.position().await.unwrap(), 45);
        assert_eq!(servo.offset().await.unwrap(), -3);

        assert_eq!(board.expect_line().await, "SERVO.setPosition(90)");
        assert_eq!(board.expect_line().await, "SERVO.getPosition()");
        assert_eq!(board.expect_line().await, "SERVO.getOffset()");
    }
}

use async_trait::async_trait;
use swarmlink_wire::args;

use super::{CachedValue, Device, DeviceCore};
use crate::error::{Result, SwarmError};

/// RGB LED on an ftSwarm. Each one draws up to 60 mA.
///
/// The getters ask the board. The last brightness and color read or written
/// are also kept locally.
#[derive(Debug)]
pub struct Pixel {
    core: DeviceCore,
    brightness: CachedValue<u8>,
    color: CachedValue<u32>,
}

impl Pixel {
    pub fn new(core: DeviceCore) -> Self {
        Self {
            core,
            brightness: CachedValue::new(0),
            color: CachedValue::new(0),
        }
    }

    /// Brightness, 0..=255.
    pub async fn brightness(&self) -> Result<u8> {
        let value = self.core.query_int("getBrightness", args![]).await?;
        let brightness =
            u8::try_from(value).map_err(|_| self.unexpected("getBrightness", value))?;
        self.brightness.update(brightness);
        Ok(brightness)
    }

    pub async fn set_brightness(&self, brightness: u8) -> Result<()> {
        self.core.execute("setBrightness", args![brightness]).await?;
        self.brightness.update(brightness);
        Ok(())
    }

    /// Color as `0xRRGGBB`.
    pub async fn color(&self) -> Result<u32> {
        let value = self.core.query_int("getColor", args![]).await?;
        let color = u32::try_from(value).map_err(|_| self.unexpected("getColor", value))?;
        self.color.update(color);
        Ok(color)
    }

    pub async fn set_color(&self, color: u32) -> Result<()> {
        self.core.execute("setColor", args![color]).await?;
        self.color.update(color);
        Ok(())
    }

    pub async fn set_rgb(&self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.set_color(rgb(red, green, blue)).await
    }

    /// Brightness last read from or written to the board.
    pub fn last_brightness(&self) -> u8 {
        self.brightness.get()
    }

    /// Color last read from or written to the board.
    pub fn last_color(&self) -> u32 {
        self.color.get()
    }

    fn unexpected(&self, verb: &str, value: i64) -> SwarmError {
        SwarmError::UnexpectedReply {
            command: format!("{}.{verb}()", self.core.port()),
            reply: Some(value.to_string()),
        }
    }
}

fn rgb(red: u8, green: u8, blue: u8) -> u32 {
    (u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue)
}

#[async_trait]
impl Device for Pixel {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        "pixel"
    }

    async fn initialize(&self) -> Result<()> {
        let brightness = self.core.initial_int("getBrightness", args![]).await?;
        if let Some(brightness) = brightness.and_then(|value| u8::try_from(value).ok()) {
            self.brightness.update(brightness);
        }
        let color = self.core.initial_int("getColor", args![]).await?;
        if let Some(color) = color.and_then(|value| u32::try_from(value).ok()) {
            self.color.update(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn packs_rgb() {
        assert_eq!(rgb(0xff, 0x80, 0x01), 0xff8001);
    }

    #[tokio::test]
    async fn color_round_trips_through_the_board() {
        let (core, mut board) = testing::core("LED1").await;
        let pixel = Pixel::new(core);

        board.say("R: \r\nR: 16711680\r\nR: -1\r\n").await;
        pixel.set_rgb(255, 0, 0).await.unwrap();
        assert_eq!(pixel.color().await.unwrap(), 0xff0000);
        assert!(matches!(
            pixel.color().await,
            Err(SwarmError::UnexpectedReply { .. })
        ));

        assert_eq!(board.expect_line().await, "LED1.setColor(16711680)");
        assert_eq!(board.expect_line().await, "LED1.getColor()");
        assert_eq!(pixel.last_color(), 0xff0000);
    }

    #[tokio::test]
    async fn initialization_reads_brightness_and_color() {
        let (core, mut board) = testing::core("LED2").await;
        let pixel = Pixel::new(core);

        board.say("R: 128\r\nR: 65280\r\n").await;
        pixel.initialize().await.unwrap();

        assert_eq!(board.expect_line().await, "LED2.getBrightness()");
        assert_eq!(board.expect_line().await, "LED2.getColor()");
        assert_eq!(pixel.last_brightness(), 128);
        assert_eq!(pixel.last_color(), 0x00ff00);
    }
}

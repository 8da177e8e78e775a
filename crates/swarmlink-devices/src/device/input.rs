use async_trait::async_trait;
use swarmlink_wire::{args, Arg, Sensor, Toggle, Trigger, SUBSCRIBE};
use tokio::sync::watch;
use tracing::trace;

use super::{parse_int, CachedValue, Device, DeviceCore};
use crate::error::Result;

/// Sensor configuration sent during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOptions {
    /// Contact wiring; fischertechnik switches are normally open on 1-3.
    pub normally_open: bool,
    /// Minimum change before the board pushes a new value.
    pub hysteresis: u32,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            normally_open: true,
            hysteresis: 0,
        }
    }
}

/// Shared by digital and analog inputs.
#[derive(Debug)]
struct InputCore {
    core: DeviceCore,
    sensor: Sensor,
    options: InputOptions,
    value: CachedValue<i64>,
}

impl InputCore {
    fn new(core: DeviceCore, sensor: Sensor, options: InputOptions) -> Self {
        Self {
            core,
            sensor,
            options,
            value: CachedValue::new(0),
        }
    }

    async fn initialize(&self) -> Result<()> {
        self.core
            .execute(
                "setSensorType",
                args![self.sensor, self.options.normally_open],
            )
            .await?;
        self.core
            .execute(SUBSCRIBE, args![self.options.hysteresis])
            .await?;
        if let Some(value) = self.core.initial_int("getValue", args![]).await? {
            self.value.update(value);
        }
        Ok(())
    }

    fn set_value(&self, raw: &str) {
        if let Some(value) = parse_int(self.core.port(), raw) {
            if self.value.update(value) {
                trace!(port = self.core.port(), value, "input changed");
            }
        }
    }

    async fn on_trigger(
        &self,
        trigger: Trigger,
        actor_port: &str,
        value: Option<i64>,
    ) -> Result<()> {
        let mut args = args![trigger, actor_port];
        args.extend(value.map(Arg::from));
        self.core.execute("onTrigger", args).await
    }
}

fn sensor_kind(sensor: Sensor) -> &'static str {
    match sensor {
        Sensor::Digital => "digital input",
        Sensor::Switch => "switch",
        Sensor::ReedSwitch => "reed switch",
        Sensor::LightBarrier => "light barrier",
        Sensor::Button => "button",
        Sensor::Analog => "analog input",
        Sensor::Voltmeter => "voltmeter",
        Sensor::Ohmmeter => "ohmmeter",
        Sensor::Thermometer => "thermometer",
        Sensor::Ldr => "ldr",
        Sensor::TrailSensor => "trail sensor",
        Sensor::ColorSensor => "color sensor",
        Sensor::Ultrasonic => "ultrasonic sensor",
        Sensor::Undefined => "input",
    }
}

/// On/off input: digital port, switch, reed switch, light barrier or the
/// onboard buttons of an ftSwarmControl.
#[derive(Debug)]
pub struct DigitalInput {
    input: InputCore,
}

impl DigitalInput {
    pub fn new(core: DeviceCore, sensor: Sensor, options: InputOptions) -> Self {
        Self {
            input: InputCore::new(core, sensor, options),
        }
    }

    pub fn sensor(&self) -> Sensor {
        self.input.sensor
    }

    /// Cached raw value.
    pub fn value(&self) -> i64 {
        self.input.value.get()
    }

    pub fn state(&self) -> bool {
        self.value() != 0
    }

    pub fn is_pressed(&self) -> bool {
        self.state()
    }

    pub fn is_released(&self) -> bool {
        !self.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.input.value.subscribe()
    }

    /// Edge since the last query, read from the board.
    pub async fn toggle(&self) -> Result<Toggle> {
        self.input.core.query_enum("getToggle", args![]).await
    }

    pub async fn has_toggled_up(&self) -> Result<bool> {
        Ok(self.toggle().await? == Toggle::ToggleUp)
    }

    pub async fn has_toggled_down(&self) -> Result<bool> {
        Ok(self.toggle().await? == Toggle::ToggleDown)
    }

    /// Let the board drive `actor_port` directly when `trigger` fires.
    pub async fn on_trigger(
        &self,
        trigger: Trigger,
        actor_port: &str,
        value: Option<i64>,
    ) -> Result<()> {
        self.input.on_trigger(trigger, actor_port, value).await
    }
}

#[async_trait]
impl Device for DigitalInput {
    fn port(&self) -> &str {
        self.input.core.port()
    }

    fn kind(&self) -> &'static str {
        sensor_kind(self.input.sensor)
    }

    async fn initialize(&self) -> Result<()> {
        self.input.initialize().await
    }

    fn set_value(&self, raw: &str) {
        self.input.set_value(raw);
    }
}

/// Analog input: raw analog port, voltmeter, ohmmeter, thermometer or LDR.
#[derive(Debug)]
pub struct AnalogInput {
    input: InputCore,
}

impl AnalogInput {
    pub fn new(core: DeviceCore, sensor: Sensor, options: InputOptions) -> Self {
        Self {
            input: InputCore::new(core, sensor, options),
        }
    }

    pub fn sensor(&self) -> Sensor {
        self.input.sensor
    }

    /// Cached raw value.
    pub fn value(&self) -> i64 {
        self.input.value.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.input.value.subscribe()
    }

    pub async fn voltage(&self) -> Result<i64> {
        self.input.core.query_int("getVoltage", args![]).await
    }

    pub async fn resistance(&self) -> Result<i64> {
        self.input.core.query_int("getResistance", args![]).await
    }

    // Firmware spells the verb this way.
    pub async fn celsius(&self) -> Result<i64> {
        self.input.core.query_int("getCelcius", args![]).await
    }

    pub async fn kelvin(&self) -> Result<i64> {
        self.input.core.query_int("getKelvin", args![]).await
    }

    pub async fn fahrenheit(&self) -> Result<i64> {
        self.input.core.query_int("getFahrenheit", args![]).await
    }

    pub async fn on_trigger(
        &self,
        trigger: Trigger,
        actor_port: &str,
        value: Option<i64>,
    ) -> Result<()> {
        self.input.on_trigger(trigger, actor_port, value).await
    }
}

#[async_trait]
impl Device for AnalogInput {
    fn port(&self) -> &str {
        self.input.core.port()
    }

    fn kind(&self) -> &'static str {
        sensor_kind(self.input.sensor)
    }

    async fn initialize(&self) -> Result<()> {
        self.input.initialize().await
    }

    fn set_value(&self, raw: &str) {
        self.input.set_value(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwarmError;
    use crate::testing;

    #[tokio::test]
    async fn digital_input_configures_then_subscribes() {
        let (core, mut board) = testing::core("A1").await;
        let input = DigitalInput::new(core, Sensor::Digital, InputOptions::default());

        board.say("R: \r\nR: \r\n").await;
        input.initialize().await.unwrap();

        assert_eq!(board.expect_line().await, "A1.setSensorType(0,true)");
        assert_eq!(board.expect_line().await, "A1.subscribe(0)");
        assert_eq!(board.expect_line().await, "A1.getValue()");
        assert_eq!(input.value(), 0);
        assert_eq!(input.input.core.link().poll_notification().await.unwrap(), None);
    }

    #[tokio::test]
    async fn initialization_seeds_the_cached_value() {
        let (core, mut board) = testing::core("A1").await;
        let input = DigitalInput::new(core, Sensor::Switch, InputOptions::default());
        let changes = input.subscribe();

        board.say("R: \r\nR: 1\r\nR: 1\r\n").await;
        input.initialize().await.unwrap();
        assert!(input.is_pressed());
        assert!(changes.has_changed().unwrap());

        // The next query gets its own reply, not one left over from setup.
        assert!(input.has_toggled_up().await.unwrap());
        assert_eq!(board.expect_line().await, "A1.setSensorType(2,true)");
        assert_eq!(board.expect_line().await, "A1.subscribe(0)");
        assert_eq!(board.expect_line().await, "A1.getValue()");
        assert_eq!(board.expect_line().await, "A1.getToggle()");
    }

    #[tokio::test]
    async fn switch_options_reach_the_wire() {
        let (core, mut board) = testing::core("A3").await;
        let options = InputOptions {
            normally_open: false,
            hysteresis: 2,
        };
        let input = DigitalInput::new(core, Sensor::Switch, options);
        assert_eq!(input.kind(), "switch");

        board.say("R: \r\nR: 0\r\n").await;
        input.initialize().await.unwrap();
        assert_eq!(board.expect_line().await, "A3.setSensorType(2,false)");
        assert_eq!(board.expect_line().await, "A3.subscribe(2)");
        assert_eq!(board.expect_line().await, "A3.getValue()");
    }

    #[tokio::test]
    async fn notifications_drive_the_cached_state() {
        let (core, _board) = testing::core("A1").await;
        let input = DigitalInput::new(core, Sensor::Button, InputOptions::default());
        assert!(input.is_released());

        input.set_value("1");
        assert!(input.is_pressed());

        input.set_value("garbage");
        assert_eq!(input.value(), 1);

        input.set_value("0");
        assert!(!input.state());
    }

    #[tokio::test]
    async fn toggle_is_read_from_the_board() {
        let (core, mut board) = testing::core("A2").await;
        let input = DigitalInput::new(core, Sensor::Digital, InputOptions::default());

        board.say("R: 1\r\nR: 2\r\n").await;
        assert!(input.has_toggled_up().await.unwrap());
        assert!(input.has_toggled_down().await.unwrap());
        assert_eq!(board.expect_line().await, "A2.getToggle()");
        assert_eq!(board.expect_line().await, "A2.getToggle()");
    }

    #[tokio::test]
    async fn unknown_toggle_value_is_an_error() {
        let (core, mut board) = testing::core("A2").await;
        let input = DigitalInput::new(core, Sensor::Digital, InputOptions::default());

        board.say("R: 9\r\n").await;
        assert!(matches!(input.toggle().await, Err(SwarmError::Wire(_))));
    }

    #[tokio::test]
    async fn trigger_value_is_optional() {
        let (core, mut board) = testing::core("A1").await;
        let input = DigitalInput::new(core, Sensor::Digital, InputOptions::default());

        board.say("R: \r\nR: \r\n").await;
        input.on_trigger(Trigger::Up, "M1", None).await.unwrap();
        input.on_trigger(Trigger::Value, "M1", Some(80)).await.unwrap();

        assert_eq!(board.expect_line().await, "A1.onTrigger(0,M1)");
        assert_eq!(board.expect_line().await, "A1.onTrigger(2,M1,80)");
    }

    #[tokio::test]
    async fn thermometer_reads_remote_values() {
        let (core, mut board) = testing::core("A4").await;
        let input = AnalogInput::new(core, Sensor::Thermometer, InputOptions::default());
        assert_eq!(input.kind(), "thermometer");

        board.say("R: 21\r\nR: ok\r\n").await;
        assert_eq!(input.celsius().await.unwrap(), 21);
        assert_eq!(board.expect_line().await, "A4.getCelcius()");

        let err = input.kelvin().await.unwrap_err();
        assert!(matches!(
            err,
            SwarmError::UnexpectedReply { reply: Some(ref r), .. } if r == "ok"
        ));
    }

    #[tokio::test]
    async fn analog_value_comes_from_notifications() {
        let (core, _board) = testing::core("A5").await;
        let input = AnalogInput::new(core, Sensor::Ldr, InputOptions::default());
        let mut changes = input.subscribe();

        input.set_value("512");
        assert_eq!(input.value(), 512);
        assert!(changes.has_changed().unwrap());
    }
}

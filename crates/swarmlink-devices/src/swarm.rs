use std::sync::Arc;

use swarmlink_link::{attach, connect_with_config, LinkError, LinkState, Multiplexer};
use swarmlink_transport::LineTransport;
use swarmlink_wire::{Actor, Arg, Command, ReplyValue, Sensor};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SwarmConfig;
use crate::device::{
    AnalogInput, BinaryActor, Device, DeviceCore, DigitalInput, I2c, InputOptions, Joystick, Lamp,
    Motor, Pixel, Servo,
};
use crate::error::Result;
use crate::poller::spawn_poller;
use crate::registry::Registry;

/// A connection to one ftSwarm board and the devices registered on it.
///
/// Cheap to clone; all clones share the link, registry and poller.
#[derive(Clone)]
pub struct Swarm {
    inner: Arc<Inner>,
}

struct Inner {
    link: Arc<Multiplexer>,
    registry: Arc<Registry>,
    poller: Mutex<Option<JoinHandle<std::result::Result<(), LinkError>>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.get_mut().take() {
            poller.abort();
        }
    }
}

impl Swarm {
    /// Open the configured serial port, bring the board up and start
    /// polling.
    pub async fn connect(config: &SwarmConfig) -> Result<Self> {
        let link =
            connect_with_config(&config.serial, config.link.clone(), config.handshake.as_ref())
                .await?;
        Ok(Self::start(link, config))
    }

    /// Same as [`Swarm::connect`] over an already open transport.
    pub async fn with_transport(
        transport: Box<dyn LineTransport>,
        config: &SwarmConfig,
    ) -> Result<Self> {
        let link = attach(transport, config.link.clone(), config.handshake.as_ref()).await?;
        Ok(Self::start(link, config))
    }

    fn start(link: Multiplexer, config: &SwarmConfig) -> Self {
        let link = Arc::new(link);
        let registry = Arc::new(Registry::new(Arc::clone(&link)));
        let poller = spawn_poller(
            Arc::clone(&link),
            Arc::clone(&registry),
            config.poll_interval,
        );
        info!(poll_interval = ?config.poll_interval, "swarm ready");

        Self {
            inner: Arc::new(Inner {
                link,
                registry,
                poller: Mutex::new(Some(poller)),
            }),
        }
    }

    pub fn link(&self) -> &Arc<Multiplexer> {
        &self.inner.link
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    pub fn state(&self) -> LinkState {
        self.inner.link.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<LinkState> {
        self.inner.link.watch_state()
    }

    /// `<port>.<verb>(<args>)`, validated.
    pub fn build_command(&self, port: &str, verb: &str, args: Vec<Arg>) -> Result<Command> {
        Ok(Command::new(port, verb, args)?)
    }

    /// Send one command and return its parsed reply. `subscribe` commands
    /// return `None` without waiting.
    pub async fn send(&self, port: &str, verb: &str, args: Vec<Arg>) -> Result<Option<ReplyValue>> {
        let command = self.build_command(port, verb, args)?;
        Ok(self.inner.link.send(&command).await?)
    }

    pub async fn route_notification(&self, line: &str) {
        self.inner.registry.route_notification(line).await;
    }

    /// See [`Registry::get_or_create`].
    pub async fn get_or_create<D, F>(&self, port: &str, factory: F) -> Result<Arc<D>>
    where
        D: Device,
        F: FnOnce(DeviceCore) -> D + Send,
    {
        self.inner.registry.get_or_create(port, factory).await
    }

    pub async fn device_count(&self) -> usize {
        self.inner.registry.len().await
    }

    /// Close the link and wait for the poller to finish. Idempotent.
    pub async fn close(&self) -> Result<()> {
        self.inner.link.close().await?;

        let poller = self.inner.poller.lock().await.take();
        if let Some(poller) = poller {
            if let Err(err) = poller.await? {
                debug!(error = %err, "poller had already stopped");
            }
        }
        Ok(())
    }

    async fn input(
        &self,
        port: &str,
        sensor: Sensor,
        options: InputOptions,
    ) -> Result<Arc<DigitalInput>> {
        self.get_or_create(port, move |core| DigitalInput::new(core, sensor, options))
            .await
    }

    async fn analog(
        &self,
        port: &str,
        sensor: Sensor,
        options: InputOptions,
    ) -> Result<Arc<AnalogInput>> {
        self.get_or_create(port, move |core| AnalogInput::new(core, sensor, options))
            .await
    }

    async fn motor_of(
        &self,
        port: &str,
        actor: Actor,
        high_precision: bool,
    ) -> Result<Arc<Motor>> {
        self.get_or_create(port, move |core| Motor::new(core, actor, high_precision))
            .await
    }

    async fn binary(&self, port: &str, actor: Actor) -> Result<Arc<BinaryActor>> {
        self.get_or_create(port, move |core| BinaryActor::new(core, actor))
            .await
    }
}

/// Device catalogue. Each call returns the device already registered on the
/// port, or registers a new one.
impl Swarm {
    pub async fn digital_input(&self, port: &str) -> Result<Arc<DigitalInput>> {
        self.input(port, Sensor::Digital, InputOptions::default())
            .await
    }

    pub async fn digital_input_with(
        &self,
        port: &str,
        sensor: Sensor,
        options: InputOptions,
    ) -> Result<Arc<DigitalInput>> {
        self.input(port, sensor, options).await
    }

    /// Mechanical switch. fischertechnik wiring: 1-3 normally open, 1-2
    /// normally closed.
    pub async fn switch(&self, port: &str) -> Result<Arc<DigitalInput>> {
        self.input(port, Sensor::Switch, InputOptions::default())
            .await
    }

    pub async fn reed_switch(&self, port: &str) -> Result<Arc<DigitalInput>> {
        self.input(port, Sensor::ReedSwitch, InputOptions::default())
            .await
    }

    pub async fn light_barrier(&self, port: &str) -> Result<Arc<DigitalInput>> {
        self.input(port, Sensor::LightBarrier, InputOptions::default())
            .await
    }

    /// Onboard button of an ftSwarmControl.
    pub async fn button(&self, port: &str) -> Result<Arc<DigitalInput>> {
        self.input(port, Sensor::Button, InputOptions::default())
            .await
    }

    pub async fn analog_input(&self, port: &str) -> Result<Arc<AnalogInput>> {
        self.analog(port, Sensor::Analog, InputOptions::default())
            .await
    }

    pub async fn analog_input_with(
        &self,
        port: &str,
        sensor: Sensor,
        options: InputOptions,
    ) -> Result<Arc<AnalogInput>> {
        self.analog(port, sensor, options).await
    }

    pub async fn voltmeter(&self, port: &str) -> Result<Arc<AnalogInput>> {
        self.analog(port, Sensor::Voltmeter, InputOptions::default())
            .await
    }

    pub async fn ohmmeter(&self, port: &str) -> Result<Arc<AnalogInput>> {
        self.analog(port, Sensor::Ohmmeter, InputOptions::default())
            .await
    }

    /// 1.5 kOhm NTC.
    pub async fn thermometer(&self, port: &str) -> Result<Arc<AnalogInput>> {
        self.analog(port, Sensor::Thermometer, InputOptions::default())
            .await
    }

    pub async fn ldr(&self, port: &str) -> Result<Arc<AnalogInput>> {
        self.analog(port, Sensor::Ldr, InputOptions::default())
            .await
    }

    /// Gray, mini or XS motor.
    pub async fn motor(&self, port: &str, high_precision: bool) -> Result<Arc<Motor>> {
        self.motor_of(port, Actor::XMotor, high_precision).await
    }

    pub async fn tractor_motor(&self, port: &str, high_precision: bool) -> Result<Arc<Motor>> {
        self.motor_of(port, Actor::Tractor, high_precision).await
    }

    pub async fn xm_motor(&self, port: &str, high_precision: bool) -> Result<Arc<Motor>> {
        self.motor_of(port, Actor::XmMotor, high_precision).await
    }

    pub async fn encoder_motor(&self, port: &str, high_precision: bool) -> Result<Arc<Motor>> {
        self.motor_of(port, Actor::Encoder, high_precision).await
    }

    pub async fn lamp(&self, port: &str, high_precision: bool) -> Result<Arc<Lamp>> {
        self.get_or_create(port, move |core| Lamp::new(core, high_precision))
            .await
    }

    pub async fn valve(&self, port: &str) -> Result<Arc<BinaryActor>> {
        self.binary(port, Actor::Valve).await
    }

    pub async fn compressor(&self, port: &str) -> Result<Arc<BinaryActor>> {
        self.binary(port, Actor::Compressor).await
    }

    pub async fn buzzer(&self, port: &str) -> Result<Arc<BinaryActor>> {
        self.binary(port, Actor::Buzzer).await
    }

    pub async fn servo(&self, port: &str) -> Result<Arc<Servo>> {
        self.get_or_create(port, Servo::new).await
    }

    pub async fn joystick(&self, port: &str, hysteresis: u32) -> Result<Arc<Joystick>> {
        self.get_or_create(port, move |core| Joystick::new(core, hysteresis))
            .await
    }

    pub async fn pixel(&self, port: &str) -> Result<Arc<Pixel>> {
        self.get_or_create(port, Pixel::new).await
    }

    pub async fn i2c(&self, port: &str) -> Result<Arc<I2c>> {
        self.get_or_create(port, I2c::new).await
    }
}

impl std::fmt::Debug for Swarm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Swarm")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

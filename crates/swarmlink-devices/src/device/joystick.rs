use async_trait::async_trait;
use swarmlink_wire::{args, Arg, Trigger, SUBSCRIBE};
use tokio::sync::watch;
use tracing::warn;

use super::{CachedValue, Device, DeviceCore};
use crate::error::Result;

/// Stick deflection: left/right and forward/backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoystickPosition {
    pub lr: i64,
    pub fb: i64,
}

impl JoystickPosition {
    /// Parse `<lr> <fb>` or `<lr>,<fb>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw
            .split([' ', ','])
            .filter(|part| !part.is_empty())
            .map(str::parse::<i64>);
        let lr = parts.next()?.ok()?;
        let fb = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { lr, fb })
    }
}

/// Joystick of an ftSwarmControl.
#[derive(Debug)]
pub struct Joystick {
    core: DeviceCore,
    hysteresis: u32,
    position: CachedValue<JoystickPosition>,
}

impl Joystick {
    pub fn new(core: DeviceCore, hysteresis: u32) -> Self {
        Self {
            core,
            hysteresis,
            position: CachedValue::default(),
        }
    }

    pub fn position(&self) -> JoystickPosition {
        self.position.get()
    }

    pub fn lr(&self) -> i64 {
        self.position().lr
    }

    pub fn fb(&self) -> i64 {
        self.position().fb
    }

    pub fn subscribe(&self) -> watch::Receiver<JoystickPosition> {
        self.position.subscribe()
    }

    pub async fn on_trigger_lr(
        &self,
        trigger: Trigger,
        actor_port: &str,
        value: Option<i64>,
    ) -> Result<()> {
        self.trigger("onTriggerLR", trigger, actor_port, value).await
    }

    pub async fn on_trigger_fb(
        &self,
        trigger: Trigger,
        actor_port: &str,
        value: Option<i64>,
    ) -> Result<()> {
        self.trigger("onTriggerFB", trigger, actor_port, value).await
    }

    async fn trigger(
        &self,
        verb: &str,
        trigger: Trigger,
        actor_port: &str,
        value: Option<i64>,
    ) -> Result<()> {
        let mut args = args![trigger, actor_port];
        args.extend(value.map(Arg::from));
        self.core.execute(verb, args).await
    }
}

#[async_trait]
impl Device for Joystick {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        "joystick"
    }

    async fn initialize(&self) -> Result<()> {
        self.core.execute(SUBSCRIBE, args![self.hysteresis]).await
    }

    fn set_value(&self, raw: &str) {
        match JoystickPosition::parse(raw) {
            Some(position) => {
                self.position.update(position);
            }
            None => warn!(port = self.core.port(), raw, "ignoring malformed joystick value"),
        }
    }
}

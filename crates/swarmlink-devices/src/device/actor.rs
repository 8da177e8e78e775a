//! Outputs on the motor ports (M1, M2). Keep the power budget in mind.

use async_trait::async_trait;
use swarmlink_wire::{args, Actor, MotionType};

use super::{Device, DeviceCore};
use crate::error::{Result, SwarmError};

const FULL_POWER: u8 = 255;

async fn declare(core: &DeviceCore, actor: Actor, high_precision: bool) -> Result<()> {
    core.execute("setActorType", args![actor, high_precision])
        .await
}

fn actor_kind(actor: Actor) -> &'static str {
    match actor {
        Actor::XMotor => "motor",
        Actor::XmMotor => "xm motor",
        Actor::Tractor => "tractor motor",
        Actor::Encoder => "encoder motor",
        Actor::Lamp => "lamp",
        Actor::Valve => "valve",
        Actor::Compressor => "compressor",
        Actor::Buzzer => "buzzer",
        Actor::Undefined => "actor",
    }
}

/// Gray, mini, XS, XM, tractor or encoder motor.
#[derive(Debug)]
pub struct Motor {
    core: DeviceCore,
    actor: Actor,
    high_precision: bool,
}

impl Motor {
    pub fn new(core: DeviceCore, actor: Actor, high_precision: bool) -> Self {
        Self {
            core,
            actor,
            high_precision,
        }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub async fn set_speed(&self, speed: i32) -> Result<()> {
        self.core.execute("setSpeed", args![speed]).await
    }

    pub async fn speed(&self) -> Result<i64> {
        self.core.query_int("getSpeed", args![]).await
    }

    /// Tractor, XM and encoder motors can coast, brake or run; plain motors
    /// only take a speed.
    pub fn has_motion_control(&self) -> bool {
        matches!(self.actor, Actor::Tractor | Actor::XmMotor | Actor::Encoder)
    }

    pub async fn set_motion_type(&self, motion: MotionType) -> Result<()> {
        self.require_motion_control("setMotionType")?;
        self.core.execute("setMotionType", args![motion]).await
    }

    pub async fn motion_type(&self) -> Result<MotionType> {
        self.require_motion_control("getMotionType")?;
        self.core.query_enum("getMotionType", args![]).await
    }

    pub async fn coast(&self) -> Result<()> {
        self.set_motion_type(MotionType::Coast).await
    }

    pub async fn brake(&self) -> Result<()> {
        self.set_motion_type(MotionType::Brake).await
    }

    pub async fn run(&self) -> Result<()> {
        self.set_motion_type(MotionType::On).await
    }

    fn require_motion_control(&self, operation: &'static str) -> Result<()> {
        if self.has_motion_control() {
            return Ok(());
        }
        Err(SwarmError::Unsupported {
            port: self.core.port().to_string(),
            kind: actor_kind(self.actor),
            operation,
        })
    }
}

#[async_trait]
impl Device for Motor {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        actor_kind(self.actor)
    }

    async fn initialize(&self) -> Result<()> {
        declare(&self.core, self.actor, self.high_precision).await
    }
}

/// Classic lamp or LED.
#[derive(Debug)]
pub struct Lamp {
    core: DeviceCore,
    high_precision: bool,
}

impl Lamp {
    pub fn new(core: DeviceCore, high_precision: bool) -> Self {
        Self {
            core,
            high_precision,
        }
    }

    pub async fn on(&self, power: u8) -> Result<()> {
        self.core.execute("setSpeed", args![power]).await
    }

    pub async fn full_on(&self) -> Result<()> {
        self.on(FULL_POWER).await
    }

    pub async fn off(&self) -> Result<()> {
        self.core.execute("setSpeed", args![0]).await
    }
}

#[async_trait]
impl Device for Lamp {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        actor_kind(Actor::Lamp)
    }

    async fn initialize(&self) -> Result<()> {
        declare(&self.core, Actor::Lamp, self.high_precision).await
    }
}

/// Valve, compressor or buzzer: either fully on or off.
#[derive(Debug)]
pub struct BinaryActor {
    core: DeviceCore,
    actor: Actor,
}

impl BinaryActor {
    pub fn new(core: DeviceCore, actor: Actor) -> Self {
        Self { core, actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub async fn on(&self) -> Result<()> {
        self.core.execute("setSpeed", args![FULL_POWER]).await
    }

    pub async fn off(&self) -> Result<()> {
        self.core.execute("setSpeed", args![0]).await
    }
}

#[async_trait]
impl Device for BinaryActor {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        actor_kind(self.actor)
    }

    async fn initialize(&self) -> Result<()> {
        declare(&self.core, self.actor, false).await
    }
}

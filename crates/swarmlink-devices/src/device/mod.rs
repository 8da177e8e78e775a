//! Typed wrappers for the peripherals attached to a board.
//!
//! Each wrapper is a [`DeviceCore`] (port plus link, for issuing commands)
//! and, where the firmware pushes state, one or more [`CachedValue`]s that
//! only the dispatcher writes to.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use swarmlink_link::Multiplexer;
use swarmlink_wire::{decode_enum, Arg, Command, ReplyValue};
use tracing::{debug, warn};

use crate::error::{Result, SwarmError};

pub mod actor;
pub mod cached;
pub mod i2c;
pub mod input;
pub mod joystick;
pub mod pixel;
pub mod servo;

pub use actor::{BinaryActor, Lamp, Motor};
pub use cached::CachedValue;
pub use i2c::{I2c, RegisterBank, REGISTER_COUNT};
pub use input::{AnalogInput, DigitalInput, InputOptions};
pub use joystick::{Joystick, JoystickPosition};
pub use pixel::Pixel;
pub use servo::Servo;

/// A peripheral registered under one port.
#[async_trait]
pub trait Device: Any + Send + Sync {
    /// Port identifier, e.g. `A1`.
    fn port(&self) -> &str;

    /// Human readable device kind.
    fn kind(&self) -> &'static str;

    /// One-time remote setup, run before the device is registered.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Apply a value pushed by the board for this port.
    fn set_value(&self, raw: &str) {
        warn!(
            port = self.port(),
            kind = self.kind(),
            raw,
            "unexpected notification"
        );
    }
}

/// Port identity and command plumbing shared by every device.
#[derive(Clone)]
pub struct DeviceCore {
    port: String,
    link: Arc<Multiplexer>,
}

impl DeviceCore {
    pub fn new(port: impl Into<String>, link: Arc<Multiplexer>) -> Self {
        Self {
            port: port.into(),
            link,
        }
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn link(&self) -> &Arc<Multiplexer> {
        &self.link
    }

    /// `<port>.<verb>(<args>)` for this device.
    pub fn command(&self, verb: &str, args: Vec<Arg>) -> Result<Command> {
        Ok(Command::new(self.port.as_str(), verb, args)?)
    }

    /// Send a command and return its parsed reply, if any.
    pub async fn send(&self, verb: &str, args: Vec<Arg>) -> Result<Option<ReplyValue>> {
        let command = self.command(verb, args)?;
        Ok(self.link.send(&command).await?)
    }

    /// Send a command whose reply carries no information.
    pub async fn execute(&self, verb: &str, args: Vec<Arg>) -> Result<()> {
        self.send(verb, args).await.map(drop)
    }

    /// Send a command that must be answered with an integer.
    pub async fn query_int(&self, verb: &str, args: Vec<Arg>) -> Result<i64> {
        let command = self.command(verb, args)?;
        match self.link.send(&command).await? {
            Some(ReplyValue::Int(value)) => Ok(value),
            other => Err(SwarmError::UnexpectedReply {
                command: command.to_line(),
                reply: other.map(|reply| reply.to_string()),
            }),
        }
    }

    /// Read a starting value during initialization.
    ///
    /// A reply that is not an integer yields `None`; link failures still
    /// propagate.
    pub async fn initial_int(&self, verb: &str, args: Vec<Arg>) -> Result<Option<i64>> {
        let command = self.command(verb, args)?;
        match self.link.send(&command).await? {
            Some(ReplyValue::Int(value)) => Ok(Some(value)),
            other => {
                debug!(%command, reply = ?other, "no integer starting value");
                Ok(None)
            }
        }
    }

    /// Send a command answered with a protocol enum discriminant.
    pub async fn query_enum<E>(&self, verb: &str, args: Vec<Arg>) -> Result<E>
    where
        E: num_enum::TryFromPrimitive<Primitive = i32>,
    {
        let value = self.query_int(verb, args).await?;
        Ok(decode_enum(value)?)
    }
}

impl fmt::Debug for DeviceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCore")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Parse an integer notification value, warning on garbage.
pub(crate) fn parse_int(port: &str, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(port, raw, "ignoring non-numeric value");
            None
        }
    }
}

//! Devices on an ftSwarm board.
//!
//! [`Swarm`] is the connection object: it owns the multiplexed link, the
//! port-to-device [`Registry`] and the background poller that feeds pushed
//! values into each device's cache.

pub mod config;
pub mod device;
pub mod error;
pub mod poller;
pub mod registry;
pub mod swarm;

#[cfg(test)]
mod testing;

pub use config::{SwarmConfig, DEFAULT_POLL_INTERVAL};
pub use device::{
    AnalogInput, BinaryActor, CachedValue, Device, DeviceCore, DigitalInput, I2c, InputOptions,
    Joystick, JoystickPosition, Lamp, Motor, Pixel, RegisterBank, Servo, REGISTER_COUNT,
};
pub use error::{Result, SwarmError};
pub use poller::spawn_poller;
pub use registry::Registry;
pub use swarm::Swarm;

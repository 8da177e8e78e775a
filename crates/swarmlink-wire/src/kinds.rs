//! Enumerations shared with the ftSwarm firmware.
//!
//! Every value crosses the wire as its integer discriminant.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::command::Arg;
use crate::error::{Result, WireError};

/// Sensor types known by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Sensor {
    Undefined = -1,
    Digital = 0,
    Analog = 1,
    Switch = 2,
    ReedSwitch = 3,
    LightBarrier = 4,
    Voltmeter = 5,
    Ohmmeter = 6,
    Thermometer = 7,
    Ldr = 8,
    TrailSensor = 9,
    ColorSensor = 10,
    Ultrasonic = 11,
    Button = 12,
}

/// Actor types known by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Actor {
    Undefined = -1,
    XMotor = 0,
    XmMotor = 1,
    Tractor = 2,
    Encoder = 3,
    Lamp = 4,
    Valve = 5,
    Compressor = 6,
    Buzzer = 7,
}

/// How a motor output behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum MotionType {
    Coast = 0,
    Brake = 1,
    On = 2,
}

/// Edge seen on a digital input since the last query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Toggle {
    NoToggle = 0,
    ToggleUp = 1,
    ToggleDown = 2,
}

/// Text alignment on a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Align {
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Events an input can fire at an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Trigger {
    Up = 0,
    Down = 1,
    Value = 2,
    I2cRead = 3,
    I2cWrite = 4,
}

macro_rules! impl_arg_from_enum {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Int(i64::from(i32::from(value)))
                }
            }
        )*
    };
}

impl_arg_from_enum!(Sensor, Actor, MotionType, Toggle, Align, Trigger);

/// Decode a reply integer into one of the protocol enums.
pub fn decode_enum<E>(value: i64) -> Result<E>
where
    E: TryFromPrimitive<Primitive = i32>,
{
    let unknown = || WireError::UnknownDiscriminant {
        name: E::NAME,
        value,
    };
    let raw = i32::try_from(value).map_err(|_| unknown())?;
    E::try_from_primitive(raw).map_err(|_| unknown())
}

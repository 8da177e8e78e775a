//! Wire vocabulary of the ftSwarm text command protocol.
//!
//! Outbound, every command is a single line:
//! - `<port>.<verb>(<arg1>,<arg2>,...)`
//!
//! Inbound, every line is classified by prefix:
//! - `R: <payload>` answers the command in flight
//! - `S: <port> <value>` pushes state for a port
//!
//! Pure data and parsing, no I/O.

pub mod command;
pub mod error;
pub mod kinds;
pub mod line;

pub use command::{validate_port, Arg, Command, SUBSCRIBE};
pub use error::{Result, WireError};
pub use kinds::{decode_enum, Actor, Align, MotionType, Sensor, Toggle, Trigger};
pub use line::{reply_payload, ReplyValue, WireLine, NOTIFICATION_PREFIX, REPLY_PREFIX};

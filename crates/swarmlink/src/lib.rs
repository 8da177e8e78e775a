//! Drive fischertechnik ftSwarm boards over a serial line.
//!
//! One serial link carries both request/reply commands and pushed sensor
//! values. swarmlink multiplexes the two, keeps a cached value per device
//! and exposes typed wrappers for the board's inputs and actors.
//!
//! # Crate Structure
//!
//! - [`transport`]: Line-framed byte channel (serial port, in-memory pipe)
//! - [`wire`]: Command lines, reply/notification classification, protocol enums
//! - [`link`]: Multiplexer, bring-up handshake, connection state
//! - [`devices`]: Device registry, background poller and device catalogue
//!
//! ```no_run
//! use swarmlink::{Swarm, SwarmConfig};
//!
//! # async fn demo() -> swarmlink::devices::Result<()> {
//! let swarm = Swarm::connect(&SwarmConfig::serial("/dev/ttyUSB0")).await?;
//! let button = swarm.digital_input("A1").await?;
//! let motor = swarm.motor("M1", false).await?;
//! if button.is_pressed() {
//!     motor.set_speed(255).await?;
//! }
//! swarm.close().await?;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use swarmlink_transport::*;
}

/// Re-export wire types.
pub mod wire {
    pub use swarmlink_wire::*;
}

/// Re-export link types.
pub mod link {
    pub use swarmlink_link::*;
}

/// Re-export device types.
pub mod devices {
    pub use swarmlink_devices::*;
}

pub use swarmlink_devices::{Swarm, SwarmConfig, SwarmError};
pub use swarmlink_wire::args;

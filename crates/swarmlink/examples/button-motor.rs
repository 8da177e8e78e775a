//! Run motor M1 while the switch on A1 is pressed.
//!
//! Usage: cargo run --example button-motor -- /dev/ttyUSB0

use swarmlink::devices::InputOptions;
use swarmlink::wire::Sensor;
use swarmlink::{Swarm, SwarmConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let swarm = Swarm::connect(&SwarmConfig::serial(path)).await?;
    let switch = swarm
        .digital_input_with("A1", Sensor::Switch, InputOptions::default())
        .await?;
    let motor = swarm.motor("M1", false).await?;

    let mut changes = switch.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let pressed = *changes.borrow_and_update() != 0;
                motor.set_speed(if pressed { 255 } else { 0 }).await?;
                println!("A1 {}", if pressed { "pressed" } else { "released" });
            }
        }
    }

    motor.set_speed(0).await?;
    swarm.close().await?;
    Ok(())
}

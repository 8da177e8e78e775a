use swarmlink_devices::{InputOptions, Swarm};
use swarmlink_link::LinkState;
use tokio::sync::watch;
use tracing::info;

use crate::cmd::{runtime, ConnectionArgs, WatchArgs};
use crate::exit::{swarm_error, CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_value, OutputFormat};

pub fn run(args: WatchArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let config = connection.swarm_config()?;

    runtime()?.block_on(async {
        let swarm = Swarm::connect(&config)
            .await
            .map_err(|err| swarm_error("connect failed", err))?;

        let watched = subscribe(&swarm, &args).await;
        let outcome = match watched {
            Ok(changes) => follow(&swarm, &args, changes, format).await,
            Err(err) => Err(err),
        };

        let closed = swarm
            .close()
            .await
            .map_err(|err| swarm_error("close failed", err));
        outcome?;
        closed?;
        Ok(SUCCESS)
    })
}

async fn subscribe(swarm: &Swarm, args: &WatchArgs) -> CliResult<watch::Receiver<i64>> {
    let options = InputOptions {
        hysteresis: args.hysteresis,
        ..InputOptions::default()
    };
    let sensor = args.kind.sensor();

    let changes = if args.kind.is_analog() {
        swarm
            .analog_input_with(&args.port, sensor, options)
            .await
            .map(|input| input.subscribe())
    } else {
        swarm
            .digital_input_with(&args.port, sensor, options)
            .await
            .map(|input| input.subscribe())
    };
    changes.map_err(|err| swarm_error("register failed", err))
}

async fn follow(
    swarm: &Swarm,
    args: &WatchArgs,
    mut changes: watch::Receiver<i64>,
    format: OutputFormat,
) -> CliResult<()> {
    let mut state = swarm.watch_state();
    let mut seen = 0usize;
    info!(port = %args.port, kind = ?args.kind, "watching");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            changed = changes.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let value = *changes.borrow_and_update();
                print_value(&args.port, value, format);
                seen += 1;
                if args.count.is_some_and(|count| seen >= count) {
                    return Ok(());
                }
            }
            _ = state.wait_for(|state| *state == LinkState::Closed) => {
                return Err(CliError::new(TRANSPORT_ERROR, "link closed while watching"));
            }
        }
    }
}

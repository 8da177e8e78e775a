use std::sync::Arc;
use std::time::Duration;

use swarmlink_link::{LinkError, Multiplexer};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::registry::Registry;

/// Start the background task that drains notifications into `registry`.
///
/// Each round polls the link once, routes what it got and then sleeps for
/// `interval`. The task ends with `Ok(())` once the link is closed through
/// [`Multiplexer::close`], and with the error when the transport fails.
pub fn spawn_poller(
    link: Arc<Multiplexer>,
    registry: Arc<Registry>,
    interval: Duration,
) -> JoinHandle<Result<(), LinkError>> {
    tokio::spawn(run(link, registry, interval))
}

async fn run(
    link: Arc<Multiplexer>,
    registry: Arc<Registry>,
    interval: Duration,
) -> Result<(), LinkError> {
    debug!(?interval, "poller started");
    loop {
        match link.poll_notification().await {
            Ok(Some(line)) => registry.route_notification(&line).await,
            Ok(None) => {}
            Err(LinkError::Closed) => {
                debug!("poller stopped, link closed");
                return Ok(());
            }
            Err(err) if err.is_fatal() => {
                error!(error = %err, "poller stopped");
                return Err(err);
            }
            Err(err) => warn!(error = %err, "poll failed"),
        }
        tokio::time::sleep(interval).await;
    }
}

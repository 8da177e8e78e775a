use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use swarmlink_link::Multiplexer;
use swarmlink_wire::{validate_port, WireLine};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::device::{Device, DeviceCore};
use crate::error::{Result, SwarmError};

/// One registered device, kept both as a trait object for dispatch and as
/// `Any` for handing back its concrete type.
struct Entry {
    device: Arc<dyn Device>,
    concrete: Arc<dyn Any + Send + Sync>,
}

impl Entry {
    fn new<D: Device>(device: Arc<D>) -> Self {
        Self {
            device: device.clone(),
            concrete: device,
        }
    }

    fn downcast<D: Device>(&self, port: &str) -> Result<Arc<D>> {
        Arc::clone(&self.concrete)
            .downcast::<D>()
            .map_err(|_| SwarmError::KindMismatch {
                port: port.to_string(),
                existing: self.device.kind(),
            })
    }
}

/// Port-to-device map and notification dispatcher.
///
/// Devices are created lazily, at most one per port, and live as long as
/// the registry.
pub struct Registry {
    link: Arc<Multiplexer>,
    devices: RwLock<HashMap<String, Entry>>,
    /// Serializes construction so a port is never initialized twice.
    creating: Mutex<()>,
}

impl Registry {
    pub fn new(link: Arc<Multiplexer>) -> Self {
        Self {
            link,
            devices: RwLock::new(HashMap::new()),
            creating: Mutex::new(()),
        }
    }

    pub fn link(&self) -> &Arc<Multiplexer> {
        &self.link
    }

    /// The device registered under `port`, if any.
    pub async fn get<D: Device>(&self, port: &str) -> Result<Option<Arc<D>>> {
        let devices = self.devices.read().await;
        devices
            .get(port)
            .map(|entry| entry.downcast(port))
            .transpose()
    }

    /// Return the device for `port`, building and initializing it with
    /// `factory` on first use.
    ///
    /// A failed initialization leaves nothing registered, so the next call
    /// starts over.
    pub async fn get_or_create<D, F>(&self, port: &str, factory: F) -> Result<Arc<D>>
    where
        D: Device,
        F: FnOnce(DeviceCore) -> D + Send,
    {
        if let Some(device) = self.get::<D>(port).await? {
            return Ok(device);
        }
        validate_port(port)?;

        let _creating = self.creating.lock().await;
        if let Some(device) = self.get::<D>(port).await? {
            return Ok(device);
        }

        let device = Arc::new(factory(DeviceCore::new(port, Arc::clone(&self.link))));
        device.initialize().await?;

        self.devices
            .write()
            .await
            .insert(port.to_string(), Entry::new(Arc::clone(&device)));
        info!(port, kind = device.kind(), "registered device");
        Ok(device)
    }

    /// Hand a line read off the link to the device it concerns.
    ///
    /// Anything that is not a notification for a registered port is logged
    /// and dropped.
    pub async fn route_notification(&self, line: &str) {
        match WireLine::classify(line) {
            WireLine::Notification { port, value } => {
                let device = self
                    .devices
                    .read()
                    .await
                    .get(&port)
                    .map(|entry| Arc::clone(&entry.device));
                match device {
                    Some(device) => {
                        debug!(%port, %value, "notification");
                        device.set_value(&value);
                    }
                    None => warn!(%port, %value, "notification for unknown port"),
                }
            }
            WireLine::Reply(payload) => warn!(%payload, "reply without a pending request"),
            WireLine::Unrecognized(line) => warn!(%line, "unrecognized line"),
        }
    }

    /// Number of registered devices.
    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Registered ports, sorted.
    pub async fn ports(&self) -> Vec<String> {
        let mut ports: Vec<String> = self.devices.read().await.keys().cloned().collect();
        ports.sort();
        ports
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

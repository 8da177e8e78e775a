use std::path::PathBuf;

use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::info;

use crate::error::{Result, TransportError};
use crate::stream::StreamTransport;

/// Baud rate the ftSwarm CLI firmware listens on.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial line settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: PathBuf,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl SerialConfig {
    /// 8N1 at the default baud rate.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

/// Open a serial device and wrap it as a line transport.
pub fn open_serial(config: &SerialConfig) -> Result<StreamTransport<SerialStream>> {
    let path = config.path.to_string_lossy().into_owned();
    let stream = tokio_serial::new(&path, config.baud_rate)
        .data_bits(config.data_bits)
        .parity(config.parity)
        .stop_bits(config.stop_bits)
        .flow_control(config.flow_control)
        .open_native_async()
        .map_err(|source| TransportError::Open {
            path: config.path.clone(),
            source,
        })?;

    info!(path = %path, baud = config.baud_rate, "opened serial port");
    Ok(StreamTransport::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_8n1_at_115200() {
        let cfg = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.data_bits, DataBits::Eight);
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.stop_bits, StopBits::One);
        assert_eq!(cfg.path, PathBuf::from("/dev/ttyUSB0"));
    }

    #[tokio::test]
    async fn open_missing_device_reports_path() {
        let cfg = SerialConfig::new("/dev/swarmlink-does-not-exist");
        let err = open_serial(&cfg).unwrap_err();
        match err {
            TransportError::Open { path, .. } => {
                assert_eq!(path, PathBuf::from("/dev/swarmlink-does-not-exist"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use swarmlink_devices::SwarmConfig;
use swarmlink_link::{HandshakeConfig, LinkConfig};
use swarmlink_transport::{SerialConfig, DEFAULT_BAUD_RATE};
use swarmlink_wire::Sensor;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod send;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command and print the reply.
    Send(SendArgs),
    /// Register an input and print every change of its value.
    Watch(WatchArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, connection, format),
        Command::Watch(args) => watch::run(args, connection, format),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the board. Shared by every subcommand that talks to one.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Serial device the board is attached to.
    #[arg(long, value_name = "PATH", env = "SWARMLINK_SERIAL", global = true)]
    pub serial: Option<PathBuf>,
    /// Baud rate.
    #[arg(long, value_name = "BAUD", env = "SWARMLINK_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,
    /// Do not reset the board; assume its CLI is already running.
    #[arg(long, global = true)]
    pub skip_reset: bool,
    /// Maximum time to wait for a reply (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "5s", global = true)]
    pub reply_timeout: String,
}

impl ConnectionArgs {
    pub fn swarm_config(&self) -> CliResult<SwarmConfig> {
        let path = self.serial.clone().ok_or_else(|| {
            CliError::new(
                USAGE,
                "no serial port given (use --serial or SWARMLINK_SERIAL)",
            )
        })?;
        let reply_timeout = parse_duration(&self.reply_timeout)?;

        Ok(SwarmConfig {
            serial: SerialConfig::new(path).with_baud_rate(self.baud),
            link: LinkConfig::default().with_reply_timeout(reply_timeout),
            handshake: (!self.skip_reset).then(HandshakeConfig::default),
            ..SwarmConfig::default()
        })
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Port identifier, e.g. A1 or M2.
    pub port: String,
    /// Command verb, e.g. getValue.
    pub verb: String,
    /// Arguments; integers, decimals and true/false are sent as numbers and
    /// booleans, anything else verbatim.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Input port, e.g. A1.
    pub port: String,
    /// Kind of input attached to the port.
    #[arg(long, value_enum, default_value = "digital")]
    pub kind: InputKind,
    /// Minimum change before the board pushes a new value.
    #[arg(long, default_value_t = 0)]
    pub hysteresis: u32,
    /// Exit after N changes.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    Digital,
    Switch,
    ReedSwitch,
    LightBarrier,
    Button,
    Analog,
    Voltmeter,
    Ohmmeter,
    Thermometer,
    Ldr,
}

impl InputKind {
    pub fn sensor(self) -> Sensor {
        match self {
            InputKind::Digital => Sensor::Digital,
            InputKind::Switch => Sensor::Switch,
            InputKind::ReedSwitch => Sensor::ReedSwitch,
            InputKind::LightBarrier => Sensor::LightBarrier,
            InputKind::Button => Sensor::Button,
            InputKind::Analog => Sensor::Analog,
            InputKind::Voltmeter => Sensor::Voltmeter,
            InputKind::Ohmmeter => Sensor::Ohmmeter,
            InputKind::Thermometer => Sensor::Thermometer,
            InputKind::Ldr => Sensor::Ldr,
        }
    }

    pub fn is_analog(self) -> bool {
        matches!(
            self,
            InputKind::Analog
                | InputKind::Voltmeter
                | InputKind::Ohmmeter
                | InputKind::Thermometer
                | InputKind::Ldr
        )
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Single-threaded runtime for the commands that talk to a board.
pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(serial: Option<&str>) -> ConnectionArgs {
        ConnectionArgs {
            serial: serial.map(PathBuf::from),
            baud: 57_600,
            skip_reset: true,
            reply_timeout: "250ms".to_string(),
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn connection_args_fill_swarm_config() {
        let config = connection(Some("/dev/ttyUSB1")).swarm_config().unwrap();
        assert_eq!(config.serial.path, PathBuf::from("/dev/ttyUSB1"));
        assert_eq!(config.serial.baud_rate, 57_600);
        assert_eq!(config.link.reply_timeout, Duration::from_millis(250));
        assert!(config.handshake.is_none());
    }

    #[test]
    fn missing_serial_is_a_usage_error() {
        let err = connection(None).swarm_config().unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn input_kinds_split_digital_and_analog() {
        assert_eq!(InputKind::ReedSwitch.sensor(), Sensor::ReedSwitch);
        assert!(!InputKind::Button.is_analog());
        assert!(InputKind::Thermometer.is_analog());
    }
}

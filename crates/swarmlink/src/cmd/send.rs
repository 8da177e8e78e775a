use swarmlink_devices::Swarm;
use swarmlink_wire::{Arg, Command};

use crate::cmd::{runtime, ConnectionArgs, SendArgs};
use crate::exit::{swarm_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let command = Command::new(
        args.port.as_str(),
        args.verb.as_str(),
        args.args.iter().map(|raw| parse_arg(raw)),
    )
    .map_err(|err| CliError::new(USAGE, err.to_string()))?;
    let config = connection.swarm_config()?;

    runtime()?.block_on(async {
        let swarm = Swarm::connect(&config)
            .await
            .map_err(|err| swarm_error("connect failed", err))?;

        let sent = swarm
            .link()
            .send(&command)
            .await
            .map_err(|err| swarm_error("send failed", err.into()));
        let closed = swarm
            .close()
            .await
            .map_err(|err| swarm_error("close failed", err));

        let reply = sent?;
        closed?;
        print_reply(&command.to_line(), reply.as_ref(), format);
        Ok(SUCCESS)
    })
}

/// Command line argument to wire argument: integer, then decimal, then
/// boolean, otherwise a bare token.
fn parse_arg(raw: &str) -> Arg {
    if let Ok(value) = raw.parse::<i64>() {
        return Arg::Int(value);
    }
    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() {
            return Arg::Float(value);
        }
    }
    match raw {
        "true" => Arg::Bool(true),
        "false" => Arg::Bool(false),
        _ => Arg::Token(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_arg_prefers_numbers() {
        assert_eq!(parse_arg("-40"), Arg::Int(-40));
        assert_eq!(parse_arg("1.5"), Arg::Float(1.5));
        assert_eq!(parse_arg("true"), Arg::Bool(true));
        assert_eq!(parse_arg("M1"), Arg::Token("M1".to_string()));
        assert_eq!(parse_arg("inf"), Arg::Token("inf".to_string()));
    }
}

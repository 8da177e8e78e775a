use std::fmt;

use serde::Serialize;

use crate::error::{Result, WireError};

/// Verb whose commands never produce a direct reply.
pub const SUBSCRIBE: &str = "subscribe";

/// Characters that would break `<port>.<verb>(<args>)` framing.
const FORBIDDEN_IN_NAMES: &[char] = &['.', '(', ')', ','];
const FORBIDDEN_IN_TOKENS: &[char] = &['(', ')', ',', '\r', '\n'];

/// One command argument in its canonical scalar form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Token(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => write!(f, "{v}"),
            Arg::Float(v) => write!(f, "{v}"),
            Arg::Bool(v) => write!(f, "{v}"),
            Arg::Token(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_arg_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_arg_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Arg::Float(f64::from(value))
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Token(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Token(value)
    }
}

/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```
/// use swarmlink_wire::{args, Arg};
///
/// assert_eq!(args![0, true], vec![Arg::Int(0), Arg::Bool(true)]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// An outbound command line: `<port>.<verb>(<arg>,<arg>,...)`.
///
/// The wire format has no escaping, so construction rejects identifiers and
/// token arguments that contain framing characters instead of mangling them.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    port: String,
    verb: String,
    args: Vec<Arg>,
}

impl Command {
    pub fn new(
        port: impl Into<String>,
        verb: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Result<Self> {
        let port = port.into();
        let verb = verb.into();
        let args: Vec<Arg> = args.into_iter().collect();

        if !is_valid_name(&port) {
            return Err(WireError::InvalidPort(port));
        }
        if !is_valid_name(&verb) {
            return Err(WireError::InvalidVerb(verb));
        }
        for (index, arg) in args.iter().enumerate() {
            let valid = match arg {
                Arg::Token(token) => !token.contains(FORBIDDEN_IN_TOKENS),
                Arg::Float(value) => value.is_finite(),
                Arg::Int(_) | Arg::Bool(_) => true,
            };
            if !valid {
                return Err(WireError::InvalidArgument {
                    index,
                    value: arg.to_string(),
                });
            }
        }

        Ok(Self { port, verb, args })
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Whether the board answers this command with exactly one `R:` line.
    pub fn expects_reply(&self) -> bool {
        self.verb != SUBSCRIBE
    }

    /// The serialized line, without terminator.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.port, self.verb)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// Check that `port` can be used as a command target.
pub fn validate_port(port: &str) -> Result<()> {
    if is_valid_name(port) {
        Ok(())
    } else {
        Err(WireError::InvalidPort(port.to_string()))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(FORBIDDEN_IN_NAMES)
        && !name.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn serializes_port_verb_and_args() {
        let cmd = Command::new("A1", "setSensorType", args![0, true]).unwrap();
        assert_eq!(cmd.to_line(), "A1.setSensorType(0,true)");
    }

    #[test]
    fn serializes_empty_argument_list() {
        let cmd = Command::new("A1", "getValue", args![]).unwrap();
        assert_eq!(cmd.to_line(), "A1.getValue()");
    }

    #[test]
    fn serializes_floats_and_tokens() {
        let cmd = Command::new("A1", "onTrigger", args![2, "M1", 0.5]).unwrap();
        assert_eq!(cmd.to_line(), "A1.onTrigger(2,M1,0.5)");
    }

    #[test]
    fn subscribe_is_fire_and_forget() {
        let sub = Command::new("A1", "subscribe", args![0]).unwrap();
        let get = Command::new("A1", "getValue", args![]).unwrap();
        assert!(!sub.expects_reply());
        assert!(get.expects_reply());
    }

    #[test]
    fn rejects_delimiters_in_tokens() {
        let err = Command::new("A1", "onTrigger", args![1, "M1,M2"]).unwrap_err();
        assert_eq!(
            err,
            WireError::InvalidArgument {
                index: 1,
                value: "M1,M2".to_string()
            }
        );
        assert!(Command::new("A1", "x", args!["a)"]).is_err());
        assert!(Command::new("A1", "x", args!["line\nbreak"]).is_err());
    }

    #[test]
    fn rejects_non_finite_floats() {
        assert!(Command::new("A1", "subscribe", args![f64::NAN]).is_err());
    }

    #[test]
    fn rejects_bad_port_and_verb() {
        assert!(matches!(
            Command::new("", "getValue", args![]),
            Err(WireError::InvalidPort(_))
        ));
        assert!(matches!(
            Command::new("A1.x", "getValue", args![]),
            Err(WireError::InvalidPort(_))
        ));
        assert!(matches!(
            Command::new("A1", "get Value", args![]),
            Err(WireError::InvalidVerb(_))
        ));
        assert!(validate_port("M2").is_ok());
        assert_eq!(
            validate_port("M 2"),
            Err(WireError::InvalidPort("M 2".to_string()))
        );
    }

    #[test]
    fn args_serialize_as_bare_json_scalars() {
        let json = serde_json::to_string(&args![1, 1.5, false, "M1"]).unwrap();
        assert_eq!(json, r#"[1,1.5,false,"M1"]"#);
    }
}

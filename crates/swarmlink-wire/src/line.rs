use std::fmt;

use serde::Serialize;

/// Prefix of a reply to the command currently in flight.
pub const REPLY_PREFIX: &str = "R: ";

/// Prefix of an unsolicited state push.
pub const NOTIFICATION_PREFIX: &str = "S: ";

/// An inbound line, classified by prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireLine {
    /// `R: <payload>`, prefix stripped.
    Reply(String),
    /// `S: <port> <value>`.
    Notification { port: String, value: String },
    /// Anything else, kept verbatim.
    Unrecognized(String),
}

impl WireLine {
    pub fn classify(line: &str) -> Self {
        if let Some(payload) = reply_payload(line) {
            return WireLine::Reply(payload.to_string());
        }

        if let Some(rest) = line.strip_prefix(NOTIFICATION_PREFIX) {
            if let Some((port, value)) = rest.split_once(' ') {
                if !port.is_empty() {
                    return WireLine::Notification {
                        port: port.to_string(),
                        value: value.to_string(),
                    };
                }
            }
        }

        WireLine::Unrecognized(line.to_string())
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, WireLine::Reply(_))
    }
}

/// The payload of a reply line, or `None` if `line` is not a reply.
///
/// A bare `R:` (trailing space lost somewhere on the way) counts as an empty
/// reply.
pub fn reply_payload(line: &str) -> Option<&str> {
    if line == "R:" {
        return Some("");
    }
    line.strip_prefix(REPLY_PREFIX)
}

/// A decoded reply payload: an integer when it parses as one, otherwise the
/// raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyValue {
    Int(i64),
    Text(String),
}

impl ReplyValue {
    pub fn parse(payload: &str) -> Self {
        match payload.trim().parse::<i64>() {
            Ok(value) => ReplyValue::Int(value),
            Err(_) => ReplyValue::Text(payload.to_string()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ReplyValue::Int(value) => Some(*value),
            ReplyValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReplyValue::Int(_) => None,
            ReplyValue::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyValue::Int(value) => write!(f, "{value}"),
            ReplyValue::Text(text) => f.write_str(text),
        }
    }
}

use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use swarmlink_wire::ReplyValue;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    command: &'a str,
    reply: Option<&'a ReplyValue>,
    timestamp: String,
}

#[derive(Serialize)]
struct ValueOutput<'a> {
    port: &'a str,
    value: i64,
    timestamp: String,
}

/// Print the outcome of one command. `None` means the command expects no
/// reply.
pub fn print_reply(command: &str, reply: Option<&ReplyValue>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                command,
                reply,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "REPLY"])
                .add_row(vec![command.to_string(), reply_text(reply)]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{command} -> {}", reply_text(reply)),
        OutputFormat::Raw => {
            if let Some(reply) = reply {
                println!("{reply}");
            }
        }
    }
}

/// Print one cached value change.
pub fn print_value(port: &str, value: i64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ValueOutput {
                port,
                value,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "VALUE"])
                .add_row(vec![port.to_string(), value.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{port} = {value}"),
        OutputFormat::Raw => println!("{value}"),
    }
}

fn reply_text(reply: Option<&ReplyValue>) -> String {
    match reply {
        Some(ReplyValue::Text(text)) if text.is_empty() => "(empty)".to_string(),
        Some(reply) => reply.to_string(),
        None => "(no reply expected)".to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_marks_empty_and_missing() {
        assert_eq!(reply_text(Some(&ReplyValue::Int(3))), "3");
        assert_eq!(reply_text(Some(&ReplyValue::Text(String::new()))), "(empty)");
        assert_eq!(reply_text(None), "(no reply expected)");
    }

    #[test]
    fn reply_json_keeps_integer_type() {
        let out = ReplyOutput {
            command: "A1.getValue()",
            reply: Some(&ReplyValue::Int(7)),
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["reply"], 7);
        assert_eq!(json["command"], "A1.getValue()");
    }
}

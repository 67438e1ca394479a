//! Console input parsing
//!
//! Lines starting with `/` are commands; anything else is said to the
//! current mode.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, PartialEq)]
pub enum Command {
    /// Submit a turn
    Say(String),
    /// Enter a mode on the user's behalf
    Mode { target: String, arguments: Value },
    /// List registered modes
    Modes,
    /// Show the current mode's history
    History,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("nothing to send")]
    Empty,

    #[error("usage: /mode <name> [json arguments]")]
    MissingMode,

    #[error("arguments must be a JSON object: {0}")]
    BadArguments(String),

    #[error("unknown command /{0}, try /help")]
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /mode <name> [json]  enter a mode, e.g. /mode book_flight {\"request\": \"flight to Paris\"}
  /modes               list modes
  /history             show what the current mode remembers
  /help                show this help
  /quit                end the conversation
Anything else is sent to the current mode.";

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let (name, tail) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(name, tail)| (name, tail.trim()));

    match name {
        "mode" => parse_mode(tail),
        "modes" => Ok(Command::Modes),
        "history" => Ok(Command::History),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

fn parse_mode(tail: &str) -> Result<Command, ParseError> {
    let (target, raw) = tail
        .split_once(char::is_whitespace)
        .map_or((tail, ""), |(target, raw)| (target, raw.trim()));
    if target.is_empty() {
        return Err(ParseError::MissingMode);
    }

    let arguments = if raw.is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ParseError::BadArguments(e.to_string()))?;
        if !value.is_object() {
            return Err(ParseError::BadArguments(format!("got {value}")));
        }
        value
    };

    Ok(Command::Mode {
        target: target.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_is_a_turn() {
        assert_eq!(
            parse("  I'd like to book a flight to Hawaii "),
            Ok(Command::Say("I'd like to book a flight to Hawaii".into()))
        );
    }

    #[test]
    fn test_mode_with_arguments() {
        assert_eq!(
            parse(r#"/mode book_flight {"request": "flight to Paris"}"#),
            Ok(Command::Mode {
                target: "book_flight".into(),
                arguments: json!({"request": "flight to Paris"}),
            })
        );
        assert_eq!(
            parse("/mode orientation"),
            Ok(Command::Mode {
                target: "orientation".into(),
                arguments: json!({}),
            })
        );
    }

    #[test]
    fn test_mode_errors() {
        assert_eq!(parse("/mode"), Err(ParseError::MissingMode));
        assert!(matches!(parse("/mode book_flight [1]"), Err(ParseError::BadArguments(_))));
        assert!(matches!(parse("/mode book_flight {oops"), Err(ParseError::BadArguments(_))));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/modes"), Ok(Command::Modes));
        assert_eq!(parse("/history"), Ok(Command::History));
        assert_eq!(parse("/exit"), Ok(Command::Quit));
        assert_eq!(parse("/?"), Ok(Command::Help));
        assert_eq!(parse("/teleport"), Err(ParseError::Unknown("teleport".into())));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }
}

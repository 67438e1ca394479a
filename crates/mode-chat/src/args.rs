//! CLI argument definitions using clap

use clap::Parser;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "mode-chat")]
#[command(about = "Talk to the flight desk from a terminal")]
#[command(version)]
pub struct Args {
    /// Mode the conversation starts in
    #[arg(long, env = "MODE_START", default_value = flight_desk::ORIENTATION)]
    pub mode: String,

    /// JSON entry arguments for the starting mode
    #[arg(long = "args", default_value = "{}", value_parser = parse_json)]
    pub arguments: Value,

    /// Ollama model used by every mode
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama3.2")]
    pub model: String,

    /// Sampling temperature
    #[arg(long, env = "OLLAMA_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Maximum model invocations per turn (overrides MODE_MAX_STEPS)
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Print raw presentation JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["mode-chat"]).unwrap();
        assert_eq!(args.arguments, json!({}));
        assert!(args.max_steps.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_starting_mode_with_arguments() {
        let args = Args::try_parse_from([
            "mode-chat",
            "--mode",
            "book_flight",
            "--args",
            r#"{"request": "flight to Hawaii"}"#,
            "--max-steps",
            "4",
        ])
        .unwrap();

        assert_eq!(args.mode, "book_flight");
        assert_eq!(args.arguments["request"], "flight to Hawaii");
        assert_eq!(args.max_steps, Some(4));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(Args::try_parse_from(["mode-chat", "--args", "{nope"]).is_err());
    }
}

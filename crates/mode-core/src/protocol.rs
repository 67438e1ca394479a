//! Text Tool-Call Protocol
//!
//! For providers without native tool calling: the tool catalog is described
//! in a system prompt section, and the model selects a tool by answering
//! with a fenced JSON block:
//!
//! ````text
//! ```tool
//! {"tool": "book_flight", "arguments": {"request": "flight to Hawaii"}}
//! ```
//! ````

use std::fmt::Write as _;

use crate::provider::ModelReply;
use crate::tool::{ToolCall, ToolSchema};

const TOOL_FENCE: &str = "```tool";
const FENCE_END: &str = "```";

/// Generate the system prompt section describing available tools
pub fn tool_prompt_section(tools: &[ToolSchema]) -> String {
    let mut prompt = String::from("## Available Tools\n\n");
    prompt.push_str("You can use exactly one of the following tools by responding with a JSON block:\n\n");
    prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");
    prompt.push_str("If no tool fits, answer in plain text.\n\n");

    for schema in tools {
        let _ = writeln!(prompt, "### {}", schema.name);
        let _ = writeln!(prompt, "{}", schema.description);

        if !schema.parameters.is_empty() {
            prompt.push_str("**Parameters:**\n");
            for param in &schema.parameters {
                let required = if param.required { " (required)" } else { "" };
                let _ = writeln!(
                    prompt,
                    "- `{}` ({}){}: {}",
                    param.name, param.param_type, required, param.description
                );
            }
        }
        prompt.push('\n');
    }

    prompt
}

/// Render a tool call the way a model would write it
pub fn format_tool_call(call: &ToolCall) -> String {
    let block = serde_json::json!({
        "tool": call.name,
        "arguments": call.arguments,
    });
    format!("{TOOL_FENCE}\n{block}\n{FENCE_END}")
}

/// Interpret raw model output as text or a tool selection
pub fn parse_reply(content: &str) -> ModelReply {
    match parse_tool_call(content) {
        Some(call) => ModelReply::ToolCall(call),
        None => ModelReply::Text {
            content: content.trim().to_string(),
        },
    }
}

/// Parse a tool call from LLM output
pub fn parse_tool_call(content: &str) -> Option<ToolCall> {
    let call = parse_fenced_tool_call(content).or_else(|| parse_inline_tool_call(content))?;
    Some(with_call_id(call))
}

fn parse_fenced_tool_call(content: &str) -> Option<ToolCall> {
    let start_idx = content.find(TOOL_FENCE)?;
    let after_marker = &content[start_idx + TOOL_FENCE.len()..];
    let end_idx = after_marker.find(FENCE_END)?;
    serde_json::from_str::<ToolCall>(after_marker[..end_idx].trim()).ok()
}

/// Fallback: raw JSON object with a "tool" key
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

fn with_call_id(mut call: ToolCall) -> ToolCall {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    call
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ParameterSchema;

    #[test]
    fn test_parse_fenced_tool_call() {
        let content = r#"Let me get that started.
```tool
{"tool": "book_flight", "arguments": {"request": "flight to Hawaii"}}
```"#;

        let ModelReply::ToolCall(call) = parse_reply(content) else {
            panic!("expected a tool call");
        };
        assert_eq!(call.name, "book_flight");
        assert_eq!(call.arguments["request"], "flight to Hawaii");
        assert!(call.id.is_some());
    }

    #[test]
    fn test_parse_inline_tool_call() {
        let call = parse_tool_call(r#"{"tool": "search_flights", "arguments": {"destination": "HNL"}}"#)
            .unwrap();
        assert_eq!(call.name, "search_flights");
    }

    #[test]
    fn test_plain_text_reply() {
        assert_eq!(
            parse_reply("  Our baggage allowance is 23kg.\n"),
            ModelReply::text("Our baggage allowance is 23kg.")
        );
        // Braces without a tool key stay text
        assert!(matches!(parse_reply("Use {curly} braces"), ModelReply::Text { .. }));
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let tools = vec![ToolSchema {
            name: "book_flight".into(),
            description: "Help the traveller book a flight".into(),
            parameters: vec![ParameterSchema::required("request", "string", "What they asked for")],
            category: Some("mode".into()),
            has_side_effects: false,
        }];

        let section = tool_prompt_section(&tools);
        assert!(section.contains("### book_flight"));
        assert!(section.contains("- `request` (string) (required): What they asked for"));
    }

    #[test]
    fn test_formatted_call_parses_back() {
        let call = ToolCall::new("buy_ticket", serde_json::json!({"flight": "HA11"}));
        let parsed = parse_tool_call(&format_tool_call(&call)).unwrap();
        assert_eq!(parsed.name, call.name);
        assert_eq!(parsed.arguments, call.arguments);
    }
}

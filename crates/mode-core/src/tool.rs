//! Tool System
//!
//! Ordinary tools are side-effecting capabilities with their own render
//! contract. A mode may also declare another mode as a tool; both kinds are
//! declared through [`ToolRef`] and look identical to the model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::mode::ModeId;
use crate::presentation::PresentationBody;

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Tool selection made by the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(alias = "tool")]
    pub name: String,

    /// Arguments object
    #[serde(default = "empty_arguments")]
    pub arguments: Value,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Text embedded in the `function` message appended to history
    pub fn to_message_content(&self) -> String {
        if self.success {
            format!("[Tool '{}' returned]\n{}", self.name, self.output)
        } else {
            format!("[Tool '{}' failed]\n{}", self.name, self.output)
        }
    }
}

/// Parameter definition for tool and mode-entry schemas
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    /// A required parameter
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    /// An optional parameter
    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

/// Tool definition schema (what the model sees)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

/// What happens after an ordinary tool's result is appended to history
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    /// Render the result with the tool's render contract and end the turn
    #[default]
    Present,
    /// Invoke the model again so it can respond to the result
    Continue,
}

/// Tool trait - implement to add new side-effecting capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with validated arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Render contract: turn a result into presentation output
    fn render(&self, result: &ToolResult) -> PresentationBody {
        serde_json::json!({
            "tool": result.name,
            "success": result.success,
            "output": result.output,
            "data": result.data,
        })
    }

    /// Whether the turn ends with this tool's render or continues with the model
    fn follow_up(&self) -> FollowUp {
        FollowUp::Present
    }
}

/// Tool declaration inside a mode definition.
///
/// Mode-entry tools reference their target by identity and are resolved
/// lazily through the registry, so modes may reference each other in cycles.
#[derive(Clone)]
pub enum ToolRef {
    /// Side-effecting tool
    Ordinary(Arc<dyn Tool>),
    /// Entering another mode
    Mode(ModeId),
}

impl ToolRef {
    /// Name the model uses to select this tool
    pub fn name(&self) -> String {
        match self {
            Self::Ordinary(tool) => tool.schema().name,
            Self::Mode(id) => id.to_string(),
        }
    }
}

impl std::fmt::Debug for ToolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordinary(tool) => f.debug_tuple("Ordinary").field(&tool.schema().name).finish(),
            Self::Mode(id) => f.debug_tuple("Mode").field(id).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the input".into(),
                parameters: vec![ParameterSchema::required("text", "string", "Text to echo")],
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let text = call.arguments.get("text").and_then(Value::as_str).unwrap_or_default();
            Ok(ToolResult::success("echo", text))
        }
    }

    #[test]
    fn test_tool_call_accepts_tool_key() {
        let call: ToolCall =
            serde_json::from_str(r#"{"tool": "echo", "arguments": {"text": "hi"}}"#).unwrap();
        assert_eq!(call.name, "echo");
        assert_eq!(call.arguments["text"], "hi");

        let bare: ToolCall = serde_json::from_str(r#"{"name": "echo"}"#).unwrap();
        assert!(bare.arguments.as_object().is_some_and(serde_json::Map::is_empty));
    }

    #[test]
    fn test_result_message_content() {
        let ok = ToolResult::success("echo", "hi");
        assert_eq!(ok.to_message_content(), "[Tool 'echo' returned]\nhi");

        let failed = ToolResult::failure("echo", "boom");
        assert!(failed.to_message_content().starts_with("[Tool 'echo' failed]"));
    }

    #[tokio::test]
    async fn test_default_render_and_follow_up() {
        let tool = Echo;
        let result = tool
            .execute(&ToolCall::new("echo", serde_json::json!({"text": "hi"})))
            .await
            .unwrap();

        let body = tool.render(&result);
        assert_eq!(body["tool"], "echo");
        assert_eq!(body["output"], "hi");
        assert_eq!(tool.follow_up(), FollowUp::Present);
    }

    #[test]
    fn test_tool_ref_names() {
        assert_eq!(ToolRef::Ordinary(Arc::new(Echo)).name(), "echo");
        assert_eq!(ToolRef::Mode(ModeId::from("book_flight")).name(), "book_flight");
    }
}

//! Mode Definitions
//!
//! A mode bundles system instructions (through its initial state), a model
//! configuration, a tool set and a text render contract. Definitions are
//! immutable once built and shared by reference across sessions.
//!
//! ```rust,ignore
//! let booking = ModeDefinition::builder("book_flight")
//!     .description("Book a flight for the traveller")
//!     .parameter(ParameterSchema::required("request", "string", "What they asked for"))
//!     .initial_state(|args| vec![Message::system(BOOKING_PROMPT), Message::user(args["request"].to_string())])
//!     .tool(SearchFlightsTool::new(inventory.clone()))
//!     .mode_tool("orientation")
//!     .build()?;
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModeError, Result};
use crate::message::Message;
use crate::presentation::PresentationBody;
use crate::provider::ModelConfig;
use crate::tool::{ParameterSchema, Tool, ToolRef, ToolSchema};

/// Stable mode identity
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeId(String);

impl ModeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for ModeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ModeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ModeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Seeds a mode's history from its validated entry arguments.
///
/// Must be pure and must not read any other mode's state.
pub type InitialStateFactory = Arc<dyn Fn(&Value) -> Vec<Message> + Send + Sync>;

/// Render contract for plain model text
pub type TextRenderer = Arc<dyn Fn(&str) -> PresentationBody + Send + Sync>;

/// Immutable description of one mode
pub struct ModeDefinition {
    id: ModeId,
    description: String,
    model: ModelConfig,
    parameters: Vec<ParameterSchema>,
    initial_state: InitialStateFactory,
    tools: Vec<ToolRef>,
    render_text: TextRenderer,
}

impl ModeDefinition {
    pub fn builder(id: impl Into<ModeId>) -> ModeDefinitionBuilder {
        ModeDefinitionBuilder::new(id)
    }

    pub fn id(&self) -> &ModeId {
        &self.id
    }

    /// Forwarded to the model when this mode is offered as a tool
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Shape of the entry arguments
    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    pub fn tools(&self) -> &[ToolRef] {
        &self.tools
    }

    /// Seed history for an entry with already-validated arguments
    pub fn initial_state(&self, arguments: &Value) -> Vec<Message> {
        (self.initial_state)(arguments)
    }

    pub fn render_text(&self, text: &str) -> PresentationBody {
        (self.render_text)(text)
    }

    /// How this mode looks when another mode offers it as a tool
    pub fn entry_schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.id.to_string(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            category: Some("mode".into()),
            has_side_effects: false,
        }
    }
}

impl fmt::Debug for ModeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeDefinition")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("model", &self.model.model)
            .field("parameters", &self.parameters.len())
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ModeDefinition`]
pub struct ModeDefinitionBuilder {
    id: ModeId,
    description: String,
    model: ModelConfig,
    parameters: Vec<ParameterSchema>,
    initial_state: Option<InitialStateFactory>,
    tools: Vec<ToolRef>,
    render_text: TextRenderer,
}

impl ModeDefinitionBuilder {
    pub fn new(id: impl Into<ModeId>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            model: ModelConfig::default(),
            parameters: Vec::new(),
            initial_state: None,
            tools: Vec::new(),
            render_text: Arc::new(|text: &str| Value::String(text.to_string())),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn parameter(mut self, parameter: ParameterSchema) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn initial_state<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Value) -> Vec<Message> + Send + Sync + 'static,
    {
        self.initial_state = Some(Arc::new(factory));
        self
    }

    /// Declare an ordinary tool
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(ToolRef::Ordinary(Arc::new(tool)));
        self
    }

    /// Declare a shared ordinary tool
    pub fn shared_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(ToolRef::Ordinary(tool));
        self
    }

    /// Declare another mode as a mode-entry tool
    pub fn mode_tool(mut self, target: impl Into<ModeId>) -> Self {
        self.tools.push(ToolRef::Mode(target.into()));
        self
    }

    pub fn render_text<F>(mut self, render: F) -> Self
    where
        F: Fn(&str) -> PresentationBody + Send + Sync + 'static,
    {
        self.render_text = Arc::new(render);
        self
    }

    pub fn build(self) -> Result<ModeDefinition> {
        if self.id.as_str().trim().is_empty() {
            return Err(ModeError::Config("Mode identity must not be empty".into()));
        }
        let initial_state = self.initial_state.ok_or_else(|| {
            ModeError::Config(format!("Mode `{}` has no initial state factory", self.id))
        })?;

        Ok(ModeDefinition {
            id: self.id,
            description: self.description,
            model: self.model,
            parameters: self.parameters,
            initial_state,
            tools: self.tools,
            render_text: self.render_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_requires_initial_state() {
        let err = ModeDefinition::builder("orientation").build().unwrap_err();
        assert!(err.is_startup_fatal());
    }

    #[test]
    fn test_initial_state_uses_arguments() {
        let mode = ModeDefinition::builder("book_flight")
            .description("Book a flight")
            .parameter(ParameterSchema::required("request", "string", "Request"))
            .initial_state(|args| {
                vec![
                    Message::system("You book flights."),
                    Message::user(args["request"].as_str().unwrap_or_default()),
                ]
            })
            .mode_tool("orientation")
            .build()
            .unwrap();

        let seed = mode.initial_state(&json!({"request": "flight to Hawaii"}));
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[1].content, "flight to Hawaii");
        assert_eq!(mode.render_text("hi"), json!("hi"));

        let schema = mode.entry_schema();
        assert_eq!(schema.name, "book_flight");
        assert_eq!(schema.category.as_deref(), Some("mode"));
        assert_eq!(schema.parameters.len(), 1);
    }

    #[test]
    fn test_mode_id_comparisons() {
        let id = ModeId::from("policy_qa");
        assert_eq!(id, "policy_qa");
        assert_eq!(id.to_string(), "policy_qa");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"policy_qa\"");
    }
}

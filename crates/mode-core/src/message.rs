//! Conversation Messages
//!
//! Standard message format used for mode-scoped history.

use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
    /// Tool result (injected as context)
    #[serde(alias = "tool")]
    Function,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Function => write!(f, "function"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Optional identifier (tool call id for function results)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Optional name (tool name for function results)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            id: None,
            name: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a function result message
    pub fn function(
        name: impl Into<String>,
        content: impl Into<String>,
        call_id: Option<String>,
    ) -> Self {
        Self {
            role: Role::Function,
            content: content.into(),
            id: call_id,
            name: Some(name.into()),
        }
    }

    /// Add a name to the message
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add an identifier to the message
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Mode-scoped conversation history.
///
/// Append-only; the only way to drop messages is to replace the whole
/// conversation on mode entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True if `history` keeps every current message, in order, as its prefix
    pub fn is_extended_by(&self, history: &[Message]) -> bool {
        history.starts_with(&self.messages)
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.id.is_none());
    }

    #[test]
    fn test_function_message_carries_name_and_id() {
        let msg = Message::function("search_flights", "3 flights", Some("call-1".into()));
        assert_eq!(msg.role, Role::Function);
        assert_eq!(msg.name.as_deref(), Some("search_flights"));
        assert_eq!(msg.id.as_deref(), Some("call-1"));
    }

    #[test]
    fn test_role_accepts_tool_alias() {
        let role: Role = serde_json::from_str("\"tool\"").unwrap();
        assert_eq!(role, Role::Function);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"function\"");
    }

    #[test]
    fn test_conversation_prefix_check() {
        let mut conv = Conversation::from(vec![Message::system("You are helpful.")]);
        conv.push(Message::user("Hi"));

        let mut extended = conv.messages().to_vec();
        extended.push(Message::assistant("Hello!"));
        assert!(conv.is_extended_by(&extended));

        let rewritten = vec![Message::system("Something else"), Message::user("Hi")];
        assert!(!conv.is_extended_by(&rewritten));
        assert!(!conv.is_extended_by(&extended[..1]));
        assert_eq!(conv.len(), 2);
    }
}

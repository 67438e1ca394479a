//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. Ollama chat
//! has no native tool calling here, so the active mode's tool catalog is
//! described in the system prompt and replies are parsed with the text
//! tool-call protocol.

use mode_core::{
    error::ModelError,
    message::{Message, Role},
    protocol::{parse_reply, tool_prompt_section},
    provider::{LlmProvider, ModelConfig, ModelInfo, ModelReply, ModelRequest},
    tool::ToolSchema,
};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
    models::ModelOptions,
    Ollama,
};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST")
            .unwrap_or_else(|_| "http://localhost".into());
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(11434);
        let timeout_secs = std::env::var("OLLAMA_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(120);

        Self {
            host,
            port,
            timeout_secs,
        }
    }

    pub fn url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(config.host.clone(), config.port),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Create with default localhost settings
    pub fn localhost() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Convert mode messages to Ollama format, describing the tool catalog
    /// in the leading system message.
    fn convert_messages(messages: &[Message], tools: &[ToolSchema]) -> Vec<ChatMessage> {
        let mut converted: Vec<ChatMessage> = messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => MessageRole::System,
                    Role::User => MessageRole::User,
                    Role::Assistant => MessageRole::Assistant,
                    // Tool results appear as user context
                    Role::Function => MessageRole::User,
                };
                ChatMessage::new(role, m.content.clone())
            })
            .collect();

        if !tools.is_empty() {
            let section = tool_prompt_section(tools);
            match converted.first_mut() {
                Some(first) if matches!(first.role, MessageRole::System) => {
                    first.content = format!("{}\n\n{section}", first.content);
                }
                _ => converted.insert(0, ChatMessage::new(MessageRole::System, section)),
            }
        }

        converted
    }

    /// Build Ollama model options
    fn build_options(config: &ModelConfig) -> ModelOptions {
        let options = ModelOptions::default()
            .temperature(config.temperature)
            .top_p(config.top_p)
            .num_predict(i32::try_from(config.max_tokens).unwrap_or(i32::MAX));

        if config.stop_sequences.is_empty() {
            options
        } else {
            options.stop(config.stop_sequences.clone())
        }
    }

    fn classify_error(message: String) -> ModelError {
        let lower = message.to_lowercase();
        if lower.contains("connection") || lower.contains("timed out") || lower.contains("refused") {
            ModelError::Unavailable(message)
        } else {
            ModelError::Provider(message)
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn health_check(&self) -> Result<bool, ModelError> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(url = %self.config.url(), "Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError> {
        let messages = Self::convert_messages(request.messages, request.tools);
        let options = Self::build_options(request.config);

        let chat = ChatMessageRequest::new(request.config.model.clone(), messages).options(options);

        let timeout = std::time::Duration::from_secs(self.config.timeout_secs);
        let response = tokio::time::timeout(timeout, self.client.send_chat_messages(chat))
            .await
            .map_err(|_| {
                ModelError::Unavailable(format!(
                    "No reply from {} within {}s",
                    self.config.url(),
                    self.config.timeout_secs
                ))
            })?
            .map_err(|e| Self::classify_error(e.to_string()))?;

        let reply = parse_reply(&response.message.content);
        tracing::debug!(
            model = %request.config.model,
            tool = matches!(reply, ModelReply::ToolCall(_)),
            "Ollama reply received"
        );
        Ok(reply)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ModelError> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                context_length: None, // Not exposed by Ollama API
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mode_core::tool::ParameterSchema;

    fn book_flight_schema() -> ToolSchema {
        ToolSchema {
            name: "book_flight".into(),
            description: "Book a flight".into(),
            parameters: vec![ParameterSchema::required("request", "string", "What to book")],
            category: Some("mode".into()),
            has_side_effects: false,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
        assert_eq!(config.url(), "http://localhost:11434");
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::function("lookup_policy", "[Tool 'lookup_policy' returned]\n23kg", None),
        ];

        let converted = OllamaProvider::convert_messages(&messages, &[]);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].content, "You are helpful.");
        assert!(matches!(converted[2].role, MessageRole::User));
    }

    #[test]
    fn test_tool_section_joins_system_prompt() {
        let messages = vec![Message::system("Route the traveller."), Message::user("Hawaii please")];

        let converted = OllamaProvider::convert_messages(&messages, &[book_flight_schema()]);
        assert_eq!(converted.len(), 2);
        assert!(converted[0].content.starts_with("Route the traveller."));
        assert!(converted[0].content.contains("### book_flight"));
    }

    #[test]
    fn test_tool_section_without_system_prompt() {
        let messages = vec![Message::user("Hawaii please")];

        let converted = OllamaProvider::convert_messages(&messages, &[book_flight_schema()]);
        assert_eq!(converted.len(), 2);
        assert!(matches!(converted[0].role, MessageRole::System));
        assert!(matches!(converted[1].role, MessageRole::User));
    }

    #[test]
    fn test_error_classification() {
        assert!(OllamaProvider::classify_error("error sending request: connection refused".into())
            .is_retryable());
        assert!(!OllamaProvider::classify_error("model 'x' not found".into()).is_retryable());
    }
}

//! LLM Provider Strategy Pattern
//!
//! The one collaborator the core suspends on. Providers receive the active
//! mode's model configuration, its history and its tool catalog, and answer
//! with either plain text or a single tool selection.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mode_core::provider::{LlmProvider, ModelConfig, ModelRequest};
//!
//! let provider = OllamaProvider::from_env();
//! let reply = provider
//!     .invoke(ModelRequest::new(&config, conversation.messages(), &catalog))
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Per-mode model configuration. Opaque to the core; forwarded to providers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier (e.g., "llama3.2", "gpt-4", "claude-3-sonnet")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 2048 }
fn default_top_p() -> f32 { 0.9 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            stop_sequences: Vec::new(),
        }
    }
}

impl ModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Outbound request for one model invocation
#[derive(Clone, Copy, Debug)]
pub struct ModelRequest<'a> {
    /// Active mode's model configuration
    pub config: &'a ModelConfig,

    /// Active mode's history
    pub messages: &'a [Message],

    /// Every tool of the active mode, ordinary and mode-entry alike
    pub tools: &'a [ToolSchema],
}

impl<'a> ModelRequest<'a> {
    pub fn new(config: &'a ModelConfig, messages: &'a [Message], tools: &'a [ToolSchema]) -> Self {
        Self {
            config,
            messages,
            tools,
        }
    }
}

/// What the model answered
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelReply {
    /// Plain text reply
    Text { content: String },
    /// Selection of exactly one declared tool
    ToolCall(ToolCall),
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn tool(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self::ToolCall(ToolCall::new(name, arguments))
    }
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub context_length: Option<u32>,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The core works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool, ModelError>;

    /// Invoke the model once
    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelReply, ModelError>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ModelError> {
        Ok(Vec::new())
    }
}

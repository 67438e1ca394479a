//! # mode-runtime
//!
//! Model-invocation providers for mode-core.
//!
//! ## Providers
//!
//! - **Ollama** (default): Local LLM inference via Ollama, with tools offered
//!   through the text tool-call protocol
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mode_runtime::ollama::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost", 11434);
//! let agent = ModeAgent::builder()
//!     .registry(registry)
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use mode_core::{
    LlmProvider, Message, ModeAgent, ModeError, ModelConfig, ModelError, ModelReply,
    ModelRequest, Result, Role,
};

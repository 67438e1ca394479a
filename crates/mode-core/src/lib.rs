//! # mode-core
//!
//! Mode-scoped conversations for LLM agents. A mode bundles history seed,
//! model configuration, tools and a render contract; a session is always in
//! exactly one mode, and switching modes replaces the model-facing history
//! while the visible transcript keeps growing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          ModeAgent                               │
//! │   submit_turn / change_mode                                      │
//! │  ┌────────────────┐  ┌────────────────┐  ┌───────────────────┐   │
//! │  │ RenderPipeline │──│ ToolDispatcher │──│ TransitionControl │   │
//! │  └───────┬────────┘  └───────┬────────┘  └─────────┬─────────┘   │
//! │          │                   │                     │             │
//! │   LlmProvider          Tool (ordinary)       ModeRegistry        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two triggers reach the transition controller: host code calling
//! [`ModeAgent::change_mode`], and the model selecting a mode-entry tool.
//! Both leave identical session state behind.

pub mod agent;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod mode;
pub mod presentation;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod render;
pub mod session;
pub mod tool;
pub mod transition;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agent::{AgentConfig, ModeAgent, ModeAgentBuilder};
pub use error::{ModeError, ModelError, Result};
pub use message::{Conversation, Message, Role};
pub use mode::{ModeDefinition, ModeId};
pub use presentation::{Presentation, PresentationBody, RenderOrigin};
pub use provider::{LlmProvider, ModelConfig, ModelReply, ModelRequest};
pub use registry::{ModeRegistry, ModeRegistryBuilder, ResolvedTool};
pub use session::{ModeSession, SessionId, SharedSession, TransitionRecord, Trigger};
pub use tool::{FollowUp, ParameterSchema, Tool, ToolCall, ToolRef, ToolResult, ToolSchema};
pub use validation::{ParameterValidator, SchemaValidator, ValidationError};

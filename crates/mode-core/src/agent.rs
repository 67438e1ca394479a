//! Mode Agent
//!
//! The host-facing action surface. Hosts create sessions and drive them
//! through [`ModeAgent::submit_turn`] and [`ModeAgent::change_mode`]; the
//! agent itself holds no per-conversation state and can be shared freely.

use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::ToolDispatcher;
use crate::error::{ModeError, Result};
use crate::message::Message;
use crate::presentation::Presentation;
use crate::provider::LlmProvider;
use crate::registry::ModeRegistry;
use crate::render::RenderPipeline;
use crate::session::{ModeSession, SharedSession, Trigger};
use crate::transition::TransitionController;
use crate::validation::{ParameterValidator, SchemaValidator};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum model invocations in one turn before giving up
    pub max_steps: usize,

    /// Record the model's text reply on the first turn after a mode entry.
    ///
    /// Off by default, so a freshly entered mode's history is exactly its
    /// seed until the user speaks.
    pub record_opening_reply: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            record_opening_reply: false,
        }
    }
}

impl AgentConfig {
    /// Read `MODE_MAX_STEPS` and `MODE_RECORD_OPENING_REPLY`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_steps = std::env::var("MODE_MAX_STEPS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_steps);
        let record_opening_reply = std::env::var("MODE_RECORD_OPENING_REPLY")
            .ok()
            .map_or(defaults.record_opening_reply, |v| {
                matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
            });

        Self {
            max_steps,
            record_opening_reply,
        }
    }
}

/// Drives sessions through the mode registry and the model
pub struct ModeAgent {
    registry: Arc<ModeRegistry>,
    provider: Arc<dyn LlmProvider>,
    validator: Arc<dyn ParameterValidator>,
    config: AgentConfig,
}

impl ModeAgent {
    /// Create a new agent
    pub fn new(
        registry: Arc<ModeRegistry>,
        provider: Arc<dyn LlmProvider>,
        validator: Arc<dyn ParameterValidator>,
        config: AgentConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            validator,
            config,
        }
    }

    pub fn builder() -> ModeAgentBuilder {
        ModeAgentBuilder::new()
    }

    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    pub fn validator(&self) -> &dyn ParameterValidator {
        self.validator.as_ref()
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn transitions(&self) -> TransitionController<'_> {
        TransitionController::new(&self.registry, self.validator.as_ref())
    }

    pub fn dispatcher(&self) -> ToolDispatcher<'_> {
        ToolDispatcher::new(self)
    }

    pub fn pipeline(&self) -> RenderPipeline<'_> {
        RenderPipeline::new(self)
    }

    /// Create a session in `mode` after validating its entry arguments
    pub fn start_session(&self, mode: &str, arguments: Value) -> Result<ModeSession> {
        let definition = self.registry.resolve(mode)?;
        let parsed = self
            .validator
            .validate(definition.parameters(), &arguments)
            .map_err(|e| ModeError::InvalidParameters {
                target: mode.to_string(),
                reason: e.to_string(),
            })?;

        let session = ModeSession::create(&self.registry, mode, &parsed)?;
        tracing::info!(session = %session.id(), mode, "Session started");
        Ok(session)
    }

    /// Append the user's message and render the reply under the current mode
    #[tracing::instrument(skip_all, fields(session = %session.id(), mode = %session.current_mode()))]
    pub async fn submit_turn(
        &self,
        session: &mut ModeSession,
        input: impl Into<String>,
    ) -> Result<Presentation> {
        let mut staged = session.stage(&self.registry)?;
        staged.conversation.push(Message::user(input));

        let presentation = self.pipeline().run(&mut staged).await?;
        session.commit(staged, Some(&presentation));
        Ok(presentation)
    }

    /// Enter `target` on the host's behalf and render its first turn
    #[tracing::instrument(skip_all, fields(session = %session.id(), from = %session.current_mode(), to = target))]
    pub async fn change_mode(
        &self,
        session: &mut ModeSession,
        target: &str,
        arguments: Value,
    ) -> Result<Presentation> {
        let mut staged = session.stage(&self.registry)?;
        self.transitions()
            .apply(&mut staged, target, &arguments, Trigger::Application)?;

        let presentation = self.pipeline().run(&mut staged).await?;
        session.commit(staged, Some(&presentation));
        Ok(presentation)
    }

    /// [`submit_turn`](Self::submit_turn) holding the session lock for the whole turn
    pub async fn submit_shared(
        &self,
        session: &SharedSession,
        input: impl Into<String>,
    ) -> Result<Presentation> {
        let mut guard = session.lock().await;
        self.submit_turn(&mut guard, input).await
    }

    /// [`change_mode`](Self::change_mode) holding the session lock for the whole turn
    pub async fn change_mode_shared(
        &self,
        session: &SharedSession,
        target: &str,
        arguments: Value,
    ) -> Result<Presentation> {
        let mut guard = session.lock().await;
        self.change_mode(&mut guard, target, arguments).await
    }
}

/// Builder for [`ModeAgent`]
pub struct ModeAgentBuilder {
    registry: Option<Arc<ModeRegistry>>,
    provider: Option<Arc<dyn LlmProvider>>,
    validator: Arc<dyn ParameterValidator>,
    config: AgentConfig,
}

impl Default for ModeAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeAgentBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            provider: None,
            validator: Arc::new(SchemaValidator::new()),
            config: AgentConfig::default(),
        }
    }

    pub fn registry(mut self, registry: ModeRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    pub fn shared_registry(mut self, registry: Arc<ModeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn ParameterValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    pub fn record_opening_reply(mut self, record: bool) -> Self {
        self.config.record_opening_reply = record;
        self
    }

    pub fn build(self) -> Result<ModeAgent> {
        let registry = self
            .registry
            .ok_or_else(|| ModeError::Config("Mode registry is required".into()))?;
        let provider = self
            .provider
            .ok_or_else(|| ModeError::Config("Provider is required".into()))?;
        if self.config.max_steps == 0 {
            return Err(ModeError::Config("max_steps must be at least 1".into()));
        }

        Ok(ModeAgent::new(registry, provider, self.validator, self.config))
    }
}

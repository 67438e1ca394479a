//! Render Pipeline
//!
//! Runs one model invocation under the active mode and hands the reply to
//! the dispatcher, repeating while the dispatcher asks to resume (a tool
//! that continues, or a mode entry). The provider call is the only
//! suspension point; everything is staged until the presentation exists.

use crate::agent::ModeAgent;
use crate::dispatch::Step;
use crate::error::{ModeError, Result};
use crate::presentation::Presentation;
use crate::provider::{ModelReply, ModelRequest};
use crate::session::{ModeSession, Staged};

/// Orchestrates model invocation and presentation output
pub struct RenderPipeline<'a> {
    agent: &'a ModeAgent,
}

impl<'a> RenderPipeline<'a> {
    pub fn new(agent: &'a ModeAgent) -> Self {
        Self { agent }
    }

    /// Invoke the model under the session's current mode and record the
    /// resulting presentation.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the
    /// session unchanged.
    pub async fn render_mode(&self, session: &mut ModeSession) -> Result<Presentation> {
        let mut staged = session.stage(self.agent.registry())?;
        let presentation = self.run(&mut staged).await?;
        session.commit(staged, Some(&presentation));
        Ok(presentation)
    }

    pub(crate) async fn run(&self, staged: &mut Staged) -> Result<Presentation> {
        let max_steps = self.agent.config().max_steps;

        for step in 1..=max_steps {
            let reply = self.invoke(staged, step).await?;
            match self.agent.dispatcher().apply(staged, reply).await? {
                Step::Finished(presentation) => return Ok(presentation),
                Step::Resume => {}
            }
        }

        Err(ModeError::StepLimit(max_steps))
    }

    async fn invoke(&self, staged: &Staged, step: usize) -> Result<ModelReply> {
        let entry = self.agent.registry().entry(staged.mode.as_str())?;
        let definition = entry.definition();
        let request = ModelRequest::new(
            definition.model(),
            staged.conversation.messages(),
            entry.catalog(),
        );

        tracing::debug!(
            mode = %staged.mode,
            model = %definition.model().model,
            step,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Invoking model"
        );

        Ok(self.agent.provider().invoke(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::message::{Message, Role};
    use crate::mode::ModeDefinition;
    use crate::presentation::RenderOrigin;
    use crate::registry::ModeRegistry;
    use crate::testing::{RecordingTool, ScriptedProvider};
    use crate::tool::ParameterSchema;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn agent(provider: Arc<ScriptedProvider>, max_steps: usize) -> ModeAgent {
        let registry = ModeRegistry::builder()
            .with_mode(
                ModeDefinition::builder("orientation")
                    .initial_state(|_| vec![Message::system("Route the traveller.")])
                    .tool(RecordingTool::new("lookup_policy").output("23kg").continuing())
                    .mode_tool("book_flight")
                    .render_text(|text| json!({"banner": text}))
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .with_mode(
                ModeDefinition::builder("book_flight")
                    .description("Book a flight")
                    .parameter(ParameterSchema::required("request", "string", "Request"))
                    .initial_state(|args| {
                        vec![Message::system(format!("Booking: {}", args["request"]))]
                    })
                    .render_text(|text| json!({"booking": text}))
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .build()
            .unwrap();

        ModeAgent::builder()
            .registry(registry)
            .provider(provider)
            .max_steps(max_steps)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_text_reply_rendered_and_recorded() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.reply_text("Where to?");
        let agent = agent(provider.clone(), 10);
        let mut session = agent.start_session("orientation", json!({})).unwrap();

        let presentation = agent.pipeline().render_mode(&mut session).await.unwrap();

        assert_eq!(presentation.body, json!({"banner": "Where to?"}));
        assert_eq!(presentation.origin, RenderOrigin::Text);
        assert!(!presentation.is_transition());
        assert_eq!(session.conversation().last().unwrap(), &Message::assistant("Where to?"));

        // Both ordinary and mode-entry tools are offered
        let requests = provider.requests();
        assert_eq!(requests[0].model, "llama3.2");
        assert_eq!(requests[0].tools, vec!["lookup_policy", "book_flight"]);
    }

    #[tokio::test]
    async fn test_model_error_leaves_session_untouched() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.fail(ModelError::Unavailable("connection refused".into()));
        let agent = agent(provider, 10);
        let mut session = agent.start_session("orientation", json!({})).unwrap();
        let before = session.conversation().to_vec();

        let err = agent.pipeline().render_mode(&mut session).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.conversation(), before.as_slice());
        assert!(session.presentation().is_empty());
    }

    #[tokio::test]
    async fn test_failure_after_tool_result_discards_it() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.reply_tool("lookup_policy", json!({}));
        provider.fail(ModelError::Provider("500".into()));
        let agent = agent(provider, 10);
        let mut session = agent.start_session("orientation", json!({})).unwrap();

        assert!(agent.pipeline().render_mode(&mut session).await.is_err());
        assert_eq!(session.conversation().len(), 1);
        assert!(session.conversation().iter().all(|m| m.role != Role::Function));
    }

    #[tokio::test]
    async fn test_step_limit() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.reply_tool("lookup_policy", json!({}));
        provider.reply_tool("lookup_policy", json!({}));
        provider.reply_text("never reached");
        let agent = agent(provider, 2);
        let mut session = agent.start_session("orientation", json!({})).unwrap();

        let err = agent.pipeline().render_mode(&mut session).await.unwrap_err();
        assert!(matches!(err, ModeError::StepLimit(2)));
        assert_eq!(session.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_render_leaves_session_untouched() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.reply_tool("book_flight", json!({"request": "Hawaii"}));
        provider.hang();
        let agent = agent(provider.clone(), 10);
        let mut session = agent.start_session("orientation", json!({})).unwrap();
        let before = session.conversation().to_vec();

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            agent.pipeline().render_mode(&mut session),
        )
        .await;

        assert!(outcome.is_err(), "render should still be pending");
        // The entry happened inside the dropped future only
        assert_eq!(provider.requests().len(), 2);
        assert_eq!(session.current_mode(), "orientation");
        assert_eq!(session.conversation(), before.as_slice());
        assert!(session.presentation().is_empty());
        assert!(session.transitions().is_empty());
    }
}

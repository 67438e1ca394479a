//! Tool Dispatcher
//!
//! Classifies a model reply against the active mode's resolved tool table:
//! plain text goes to the mode's text renderer, ordinary tools run and are
//! rendered (or continue the turn), mode-entry tools go to the transition
//! controller and the turn resumes under the new mode.

use std::sync::Arc;

use crate::agent::ModeAgent;
use crate::error::{ModeError, Result};
use crate::message::Message;
use crate::presentation::{Presentation, RenderOrigin};
use crate::protocol::format_tool_call;
use crate::provider::ModelReply;
use crate::registry::ResolvedTool;
use crate::session::{ModeSession, Staged, Trigger};
use crate::tool::{FollowUp, Tool, ToolCall, ToolResult};

/// Outcome of handling one reply
#[derive(Debug)]
pub(crate) enum Step {
    /// The turn produced its presentation
    Finished(Presentation),
    /// The model must be invoked again under the (possibly new) active mode
    Resume,
}

/// Routes model replies to renderers, tools and transitions
pub struct ToolDispatcher<'a> {
    agent: &'a ModeAgent,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(agent: &'a ModeAgent) -> Self {
        Self { agent }
    }

    /// Handle a reply the host already obtained from the model.
    ///
    /// Ordinary tools that continue and mode entries re-enter the render
    /// pipeline. The session only changes if the whole chain succeeds.
    pub async fn dispatch(&self, session: &mut ModeSession, reply: ModelReply) -> Result<Presentation> {
        let mut staged = session.stage(self.agent.registry())?;
        let presentation = match self.apply(&mut staged, reply).await? {
            Step::Finished(presentation) => presentation,
            Step::Resume => self.agent.pipeline().run(&mut staged).await?,
        };
        session.commit(staged, Some(&presentation));
        Ok(presentation)
    }

    pub(crate) async fn apply(&self, staged: &mut Staged, reply: ModelReply) -> Result<Step> {
        let entry = self.agent.registry().entry(staged.mode.as_str())?;

        let call = match reply {
            ModelReply::Text { content } => {
                let body = entry.definition().render_text(&content);
                if !staged.opening || self.agent.config().record_opening_reply {
                    staged.conversation.push(Message::assistant(content));
                }
                staged.opening = false;
                return Ok(Step::Finished(
                    Presentation::new(staged.mode.clone(), RenderOrigin::Text, body)
                        .with_entered_from(staged.entered_from.clone()),
                ));
            }
            ModelReply::ToolCall(call) => call,
        };

        let tool = entry.tool(&call.name).cloned().ok_or_else(|| ModeError::UnknownTool {
            mode: staged.mode.to_string(),
            tool: call.name.clone(),
        })?;

        match tool {
            ResolvedTool::Ordinary(tool) => self.run_tool(staged, &tool, call).await,
            ResolvedTool::ModeEntry(target) => {
                tracing::debug!(from = %staged.mode, to = %target, "Model selected mode-entry tool");
                self.agent
                    .transitions()
                    .apply(staged, target.as_str(), &call.arguments, Trigger::Model)?;
                Ok(Step::Resume)
            }
        }
    }

    async fn run_tool(&self, staged: &mut Staged, tool: &Arc<dyn Tool>, call: ToolCall) -> Result<Step> {
        let schema = tool.schema();
        let arguments = self
            .agent
            .validator()
            .validate(&schema.parameters, &call.arguments)
            .map_err(|e| ModeError::InvalidParameters {
                target: call.name.clone(),
                reason: e.to_string(),
            })?;

        let call_id = call
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let call = ToolCall {
            name: call.name,
            arguments,
            id: Some(call_id.clone()),
        };

        tracing::debug!(tool = %call.name, mode = %staged.mode, "Executing tool");
        let result = match tool.execute(&call).await {
            Ok(mut result) => {
                result.id = Some(call_id.clone());
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::failure(call.name.clone(), format!("Error: {e}")).with_id(call_id.clone())
            }
        };

        staged.conversation.push(
            Message::assistant(format_tool_call(&call))
                .with_name(call.name.clone())
                .with_id(call_id.clone()),
        );
        staged
            .conversation
            .push(Message::function(call.name.clone(), result.to_message_content(), Some(call_id)));
        staged.opening = false;

        match tool.follow_up() {
            FollowUp::Present => Ok(Step::Finished(
                Presentation::new(
                    staged.mode.clone(),
                    RenderOrigin::Tool { name: call.name },
                    tool.render(&result),
                )
                .with_entered_from(staged.entered_from.clone()),
            )),
            FollowUp::Continue => Ok(Step::Resume),
        }
    }
}

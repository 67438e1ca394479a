//! Test doubles
//!
//! A provider that answers from a script and records every request, and an
//! ordinary tool that records its arguments. Enabled for downstream crates
//! with the `testing` feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ModeError, ModelError, Result};
use crate::message::Message;
use crate::presentation::PresentationBody;
use crate::provider::{LlmProvider, ModelReply, ModelRequest};
use crate::tool::{FollowUp, ParameterSchema, Tool, ToolCall, ToolResult, ToolSchema};

enum Scripted {
    Reply(ModelReply),
    Fail(ModelError),
    /// Never completes; for cancellation tests
    Hang,
}

/// Owned copy of a request the provider received
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Names of the tools offered, in catalog order
    pub tools: Vec<String>,
}

/// Mock provider that returns queued replies
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: Scripted) {
        self.script.lock().unwrap().push_back(entry);
    }

    /// Queue a reply
    pub fn reply(&self, reply: ModelReply) {
        self.push(Scripted::Reply(reply));
    }

    /// Queue a plain text reply
    pub fn reply_text(&self, content: impl Into<String>) {
        self.reply(ModelReply::text(content));
    }

    /// Queue a tool selection
    pub fn reply_tool(&self, name: impl Into<String>, arguments: Value) {
        self.reply(ModelReply::tool(name, arguments));
    }

    /// Queue a failure
    pub fn fail(&self, error: ModelError) {
        self.push(Scripted::Fail(error));
    }

    /// Queue an invocation that never completes
    pub fn hang(&self) {
        self.push(Scripted::Hang);
    }

    /// Get recorded requests
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn health_check(&self) -> std::result::Result<bool, ModelError> {
        Ok(true)
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> std::result::Result<ModelReply, ModelError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: request.config.model.clone(),
            messages: request.messages.to_vec(),
            tools: request.tools.iter().map(|t| t.name.clone()).collect(),
        });

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(ModelError::Unavailable("No scripted reply queued".into())),
        }
    }
}

/// Ordinary tool with a fixed output that records the arguments it ran with
pub struct RecordingTool {
    name: String,
    parameters: Vec<ParameterSchema>,
    output: String,
    failure: Option<String>,
    follow_up: FollowUp,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            output: "ok".into(),
            failure: None,
            follow_up: FollowUp::Present,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn parameter(mut self, parameter: ParameterSchema) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Make every execution fail with `message`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Re-invoke the model after the result instead of rendering it
    pub fn continuing(mut self) -> Self {
        self.follow_up = FollowUp::Continue;
        self
    }

    /// Handle to the recorded arguments, usable after the tool is moved into a mode
    pub fn calls(&self) -> Arc<Mutex<Vec<Value>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: format!("Recording tool {}", self.name),
            parameters: self.parameters.clone(),
            category: Some("testing".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        self.calls.lock().unwrap().push(call.arguments.clone());
        match &self.failure {
            Some(message) => Err(ModeError::Other(message.clone())),
            None => Ok(ToolResult::success(self.name.clone(), self.output.clone())),
        }
    }

    fn render(&self, result: &ToolResult) -> PresentationBody {
        serde_json::json!({
            "tool": result.name,
            "success": result.success,
            "output": result.output,
        })
    }

    fn follow_up(&self) -> FollowUp {
        self.follow_up
    }
}

//! Session Management
//!
//! One [`ModeSession`] per conversation. It holds the active mode, that
//! mode's history, and the visible transcript, which survives transitions
//! even though the history does not.
//!
//! Turn operations work on a staged copy and commit it in one assignment
//! once every model and tool step has finished, so a failed or dropped turn
//! leaves the session exactly as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{ModeError, Result};
use crate::message::{Conversation, Message};
use crate::mode::ModeId;
use crate::presentation::Presentation;
use crate::registry::ModeRegistry;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who asked for a mode entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Host code called `change_mode`
    Application,
    /// The model selected a mode-entry tool
    Model,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Application => write!(f, "application"),
            Trigger::Model => write!(f, "model"),
        }
    }
}

/// A completed mode entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: ModeId,
    pub to: ModeId,
    pub trigger: Trigger,
    /// Validated entry arguments
    pub arguments: Value,
    pub at: DateTime<Utc>,
}

/// Shared handle for hosts that reach one session from several tasks.
///
/// The mutex is the single mutation path; hold it for the whole turn.
pub type SharedSession = Arc<Mutex<ModeSession>>;

/// Per-conversation mode state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModeSession {
    id: SessionId,
    current_mode: ModeId,
    conversation: Conversation,
    presentation: Vec<Presentation>,
    transitions: Vec<TransitionRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    active: bool,
}

impl ModeSession {
    /// Start a conversation in `mode`, seeded from its initial state factory.
    ///
    /// `arguments` are handed to the factory as-is; use
    /// [`ModeAgent::start_session`](crate::agent::ModeAgent::start_session)
    /// to validate them first.
    pub fn create(registry: &ModeRegistry, mode: &str, arguments: &Value) -> Result<Self> {
        let definition = registry.resolve(mode)?;
        let seed = definition.initial_state(arguments);
        if seed.is_empty() {
            return Err(ModeError::InvalidSessionState(format!(
                "mode `{mode}` produced an empty initial state"
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: SessionId::new(),
            current_mode: definition.id().clone(),
            conversation: Conversation::from(seed),
            presentation: Vec::new(),
            transitions: Vec::new(),
            created_at: now,
            updated_at: now,
            active: true,
        })
    }

    /// Wrap for shared use across tasks
    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn current_mode(&self) -> &ModeId {
        &self.current_mode
    }

    /// History of the current mode only
    pub fn conversation(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Visible transcript across all modes
    pub fn presentation(&self) -> &[Presentation] {
        &self.presentation
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a user message to the current mode's history
    pub fn append_user_message(&mut self, content: impl Into<String>) -> Result<()> {
        self.ensure_active()?;
        self.conversation.push(Message::user(content));
        self.touch();
        Ok(())
    }

    /// Replace the history with an extension of itself.
    ///
    /// Anything that drops or rewrites an existing message is rejected; only
    /// mode entry may reset history.
    pub fn update(&mut self, history: Vec<Message>) -> Result<()> {
        self.ensure_active()?;
        if !self.conversation.is_extended_by(&history) {
            return Err(ModeError::HistoryRewrite(format!(
                "{} existing messages are not a prefix of the {} supplied",
                self.conversation.len(),
                history.len()
            )));
        }
        self.conversation = Conversation::from(history);
        self.touch();
        Ok(())
    }

    /// End the session; later turns fail with `InvalidSessionState`
    pub fn end(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Duration since creation
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }

    pub(crate) fn ensure_active(&self) -> Result<()> {
        if !self.active {
            return Err(ModeError::InvalidSessionState(format!(
                "session {} has ended",
                self.id
            )));
        }
        if self.conversation.is_empty() {
            return Err(ModeError::InvalidSessionState(format!(
                "session {} has no active mode state",
                self.id
            )));
        }
        Ok(())
    }

    /// Working copy for a turn under `registry`
    pub(crate) fn stage(&self, registry: &ModeRegistry) -> Result<Staged> {
        self.ensure_active()?;
        if !registry.contains(self.current_mode.as_str()) {
            return Err(ModeError::InvalidSessionState(format!(
                "session {} is in unregistered mode {}",
                self.id, self.current_mode
            )));
        }
        Ok(Staged {
            mode: self.current_mode.clone(),
            conversation: self.conversation.clone(),
            transitions: Vec::new(),
            entered_from: None,
            opening: false,
        })
    }

    /// Publish a finished turn. Synchronous: nothing here can be interrupted.
    pub(crate) fn commit(&mut self, staged: Staged, presentation: Option<&Presentation>) {
        self.current_mode = staged.mode;
        self.conversation = staged.conversation;
        self.transitions.extend(staged.transitions);
        if let Some(presentation) = presentation {
            self.presentation.push(presentation.clone());
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Uncommitted turn state
#[derive(Debug)]
pub(crate) struct Staged {
    pub mode: ModeId,
    pub conversation: Conversation,
    pub transitions: Vec<TransitionRecord>,
    /// Mode the turn started in, once the turn has entered another mode
    pub entered_from: Option<ModeId>,
    /// Nothing has happened in the current mode since it was entered
    pub opening: bool,
}

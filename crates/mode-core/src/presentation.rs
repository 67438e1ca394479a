//! Presentation Output
//!
//! The visible transcript. Bodies come from render contracts and are threaded
//! through unmodified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mode::ModeId;

/// Opaque output of a render contract
pub type PresentationBody = serde_json::Value;

/// Which render contract produced a record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderOrigin {
    /// The mode's `render_text` contract
    Text,
    /// An ordinary tool's render contract
    Tool { name: String },
}

/// One completed turn's visible output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Mode whose render contract produced the body
    pub mode: ModeId,

    pub origin: RenderOrigin,

    /// Mode the turn started in, when the turn entered another mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_from: Option<ModeId>,

    pub body: PresentationBody,

    pub rendered_at: DateTime<Utc>,
}

impl Presentation {
    pub fn new(mode: ModeId, origin: RenderOrigin, body: PresentationBody) -> Self {
        Self {
            mode,
            origin,
            entered_from: None,
            body,
            rendered_at: Utc::now(),
        }
    }

    pub fn with_entered_from(mut self, from: Option<ModeId>) -> Self {
        self.entered_from = from;
        self
    }

    /// Whether this turn switched modes
    pub fn is_transition(&self) -> bool {
        self.entered_from.is_some()
    }
}

//! Error Types

use thiserror::Error;

/// Result type alias for mode operations
pub type Result<T> = std::result::Result<T, ModeError>;

/// Failures surfaced by a model-invocation collaborator.
///
/// Passed through unchanged inside [`ModeError::ModelInvocation`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Reply could not be interpreted as text or a tool selection
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}

impl ModelError {
    /// Check if error is transient. The core never retries; hosts may.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::RateLimited(_))
    }
}

/// Mode system error types
#[derive(Error, Debug)]
pub enum ModeError {
    /// Mode identity is not in the registry
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// Mode identity registered twice
    #[error("Duplicate mode: {0}")]
    DuplicateMode(String),

    /// Two tools in one mode share a name
    #[error("Duplicate tool `{tool}` in mode `{mode}`")]
    DuplicateTool { mode: String, tool: String },

    /// Entry or tool arguments rejected by the parameter validator
    #[error("Invalid parameters for `{target}`: {reason}")]
    InvalidParameters { target: String, reason: String },

    /// Model selected a tool the active mode does not declare
    #[error("Unknown tool `{tool}` in mode `{mode}`")]
    UnknownTool { mode: String, tool: String },

    /// Session cannot accept the operation
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// History update would drop or rewrite existing messages
    #[error("History rewrite rejected: {0}")]
    HistoryRewrite(String),

    /// Too many model invocations in a single turn
    #[error("Maximum steps ({0}) reached in a single turn")]
    StepLimit(usize),

    /// Model invocation failed
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl ModeError {
    /// Errors that indicate a broken mode declaration rather than a bad turn.
    ///
    /// Hosts should abort startup on these instead of recovering.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateMode(_) | Self::DuplicateTool { .. } | Self::Config(_)
        )
    }

    /// Check if the failed turn may succeed when repeated unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ModelInvocation(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownMode(name) => format!("There is no '{name}' mode."),
            Self::InvalidParameters { target, reason } => {
                format!("Could not start '{target}': {reason}")
            }
            Self::UnknownTool { tool, .. } => {
                format!("The assistant tried to use '{tool}', which is not available here.")
            }
            Self::InvalidSessionState(_) => {
                "This conversation has ended. Please start a new one.".into()
            }
            Self::StepLimit(_) => {
                "The request took too long to process. Please try a simpler query.".into()
            }
            Self::ModelInvocation(ModelError::Unavailable(_)) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::ModelInvocation(ModelError::RateLimited(_)) => {
                "You've made too many requests. Please wait a moment.".into()
            }
            Self::ModelInvocation(ModelError::Auth(_)) => {
                "Authentication failed. Please check your credentials.".into()
            }
            Self::ModelInvocation(e) => format!("The AI service encountered an error: {e}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for ModeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_fatal_classification() {
        assert!(ModeError::DuplicateMode("orientation".into()).is_startup_fatal());
        assert!(
            ModeError::DuplicateTool {
                mode: "a".into(),
                tool: "b".into()
            }
            .is_startup_fatal()
        );
        assert!(!ModeError::UnknownMode("x".into()).is_startup_fatal());
        assert!(!ModeError::StepLimit(3).is_startup_fatal());
    }

    #[test]
    fn test_retryable_passthrough() {
        let err: ModeError = ModelError::RateLimited("slow down".into()).into();
        assert!(err.is_retryable());

        let err: ModeError = ModelError::Auth("bad key".into()).into();
        assert!(!err.is_retryable());
        assert!(err.user_message().contains("Authentication"));
    }
}

//! Agent port
//!
//! An agent is a black-box capability that turns a repository payload into
//! findings. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use ensemble_domain::{AgentOutput, AnalysisInput, ErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a single `analyze()` attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("{0}")]
    Invocation(String),

    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Malformed agent output: {0}")]
    MalformedOutput(String),

    #[error("Agent panicked: {0}")]
    Panicked(String),
}

impl AgentError {
    pub fn invocation(message: impl Into<String>) -> Self {
        AgentError::Invocation(message.into())
    }

    /// Report category; timeouts are kept apart, everything else is an invocation failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Timeout(_) => ErrorKind::Timeout,
            _ => ErrorKind::AgentInvocation,
        }
    }
}

/// An analysis agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Identifier used in logs, e.g. `claude/security`
    fn name(&self) -> &str;

    /// Analyze the input. The input must not be mutated.
    async fn analyze(&self, input: &AnalysisInput) -> Result<AgentOutput, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_its_own_kind() {
        assert_eq!(
            AgentError::Timeout(Duration::from_millis(30)).kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            AgentError::invocation("Agent failure").kind(),
            ErrorKind::AgentInvocation
        );
        assert_eq!(
            AgentError::Panicked("boom".into()).kind(),
            ErrorKind::AgentInvocation
        );
    }

    #[test]
    fn invocation_error_displays_message_verbatim() {
        assert_eq!(AgentError::invocation("Agent failure").to_string(), "Agent failure");
        assert_eq!(
            AgentError::Timeout(Duration::from_millis(1500)).to_string(),
            "Timed out after 1500ms"
        );
    }
}

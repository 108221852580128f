//! Domain error types

use crate::agent::validation::ConfigIssue;
use crate::core::role::AgentRole;
use thiserror::Error;

/// Raised while building a plan, never while executing one.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Invalid configuration '{name}': {}", summarize(.issues))]
    Invalid {
        name: String,
        issues: Vec<ConfigIssue>,
    },

    #[error("No provider could be selected for role {0}")]
    NoSelection(AgentRole),
}

impl ConfigurationError {
    /// The blocking issues behind this error, if any
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            ConfigurationError::Invalid { issues, .. } => issues,
            ConfigurationError::NoSelection(_) => &[],
        }
    }
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

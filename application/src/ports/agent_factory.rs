//! Agent factory port
//!
//! The collaborator that instantiates concrete [`Agent`]s for a role and
//! provider. The engine never constructs agents itself.

use super::agent::Agent;
use async_trait::async_trait;
use ensemble_domain::{AgentConfig, AgentRole, Provider};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while creating an agent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentCreationError {
    #[error("No agent is registered for provider '{0}'")]
    UnsupportedProvider(Provider),

    #[error("Agent configuration is missing {0}")]
    MissingField(&'static str),

    #[error("Agent creation failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait AgentFactory: Send + Sync {
    /// Create an agent playing `role` backed by `provider`.
    ///
    /// `config` carries tuning (temperature, token budget, focus areas and
    /// opaque parameters).
    async fn create_agent(
        &self,
        role: AgentRole,
        provider: &Provider,
        config: &AgentConfig,
    ) -> Result<Arc<dyn Agent>, AgentCreationError>;
}

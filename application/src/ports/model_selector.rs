//! Model selection port
//!
//! Picking the best provider for a role is a heuristic owned by an external
//! collaborator; the factory only consumes its answer.

use async_trait::async_trait;
use ensemble_domain::{AgentRole, AgentSelection, RepositoryContext};

#[async_trait]
pub trait ModelSelector: Send + Sync {
    /// Choose a provider for `role`, or `None` when nothing fits.
    async fn select(&self, role: AgentRole, context: &RepositoryContext) -> Option<AgentSelection>;
}

//! Preference-table model selector
//!
//! Answers [`ModelSelector`] queries from a static role → provider table
//! with an optional default. It ignores the repository context.

use crate::config::FileSelectionConfig;
use async_trait::async_trait;
use ensemble_application::ModelSelector;
use ensemble_domain::{AgentRole, AgentSelection, Provider, RepositoryContext};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PreferenceSelector {
    roles: HashMap<AgentRole, Provider>,
    default: Option<Provider>,
}

impl PreferenceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FileSelectionConfig) -> Self {
        Self {
            roles: config.parse_roles().into_iter().collect(),
            default: config.default.clone(),
        }
    }

    pub fn prefer(mut self, role: AgentRole, provider: Provider) -> Self {
        self.roles.insert(role, provider);
        self
    }

    pub fn with_default(mut self, provider: Provider) -> Self {
        self.default = Some(provider);
        self
    }
}

#[async_trait]
impl ModelSelector for PreferenceSelector {
    async fn select(&self, role: AgentRole, _context: &RepositoryContext) -> Option<AgentSelection> {
        self.roles
            .get(&role)
            .or(self.default.as_ref())
            .map(|provider| AgentSelection::new(provider.clone(), role))
    }
}

//! Inputs and outputs of provider selection

use crate::agent::config::{AgentConfig, AgentPosition};
use crate::core::provider::Provider;
use crate::core::role::AgentRole;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositorySize {
    Small,
    #[default]
    Medium,
    Large,
}

/// What a selector knows about the repository when picking providers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryContext {
    /// Primary languages, most significant first
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub size: RepositorySize,
}

impl RepositoryContext {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: RepositorySize) -> Self {
        self.size = size;
        self
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }
}

/// A chosen provider for a role, with optional tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSelection {
    pub provider: Provider,
    pub role: AgentRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl AgentSelection {
    pub fn new(provider: Provider, role: AgentRole) -> Self {
        Self {
            provider,
            role,
            temperature: None,
            max_tokens: None,
            focus_areas: Vec::new(),
            parameters: Map::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_focus_areas<I, S>(mut self, focus_areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_areas = focus_areas.into_iter().map(Into::into).collect();
        self
    }

    /// Build the agent configuration for the given position.
    pub fn to_agent_config(&self, position: AgentPosition) -> AgentConfig {
        let mut agent = AgentConfig::new(self.provider.clone(), self.role, position)
            .with_focus_areas(self.focus_areas.iter().cloned());
        if let Some(temperature) = self.temperature {
            agent.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            agent.max_tokens = max_tokens;
        }
        agent.parameters = self.parameters.clone();
        agent
    }
}

impl From<(Provider, AgentRole)> for AgentSelection {
    fn from((provider, role): (Provider, AgentRole)) -> Self {
        AgentSelection::new(provider, role)
    }
}

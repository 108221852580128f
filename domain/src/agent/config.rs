//! Agent and plan configuration entities
//!
//! [`AgentConfig`] describes one agent's role in a plan and
//! [`MultiAgentConfig`] the whole plan. Both are deserialized leniently
//! (identity fields are optional) and are only trusted after passing
//! [`validate_config`](super::validation::validate_config).

use crate::core::provider::Provider;
use crate::core::role::AgentRole;
use crate::orchestration::strategy::AnalysisStrategy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;

/// Default time budget for a single `analyze()` attempt.
pub const DEFAULT_FALLBACK_TIMEOUT_MS: u64 = 30_000;

/// Default bound on in-flight agent invocations.
pub const DEFAULT_MAX_CONCURRENT_AGENTS: usize = 3;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 4_000;

/// Where an agent sits in a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPosition {
    Primary,
    Secondary,
    Fallback,
    Specialist,
}

impl AgentPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentPosition::Primary => "primary",
            AgentPosition::Secondary => "secondary",
            AgentPosition::Fallback => "fallback",
            AgentPosition::Specialist => "specialist",
        }
    }
}

impl std::fmt::Display for AgentPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One agent's role in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub provider: Option<Provider>,
    pub role: Option<AgentRole>,
    pub position: Option<AgentPosition>,
    /// Orders fallback candidates; higher is tried first
    pub priority: i32,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Glob patterns scoping a specialist to part of the repository
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    /// Opaque provider-specific settings
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: None,
            role: None,
            position: None,
            priority: 0,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            focus_areas: Vec::new(),
            parameters: Map::new(),
        }
    }
}

impl AgentConfig {
    pub fn new(provider: Provider, role: AgentRole, position: AgentPosition) -> Self {
        Self {
            provider: Some(provider),
            role: Some(role),
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn primary(provider: Provider, role: AgentRole) -> Self {
        Self::new(provider, role, AgentPosition::Primary)
    }

    pub fn secondary(provider: Provider, role: AgentRole) -> Self {
        Self::new(provider, role, AgentPosition::Secondary)
    }

    pub fn fallback(provider: Provider, role: AgentRole, priority: i32) -> Self {
        Self::new(provider, role, AgentPosition::Fallback).with_priority(priority)
    }

    pub fn specialist<I, S>(provider: Provider, role: AgentRole, focus_areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(provider, role, AgentPosition::Specialist).with_focus_areas(focus_areas)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
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

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn is_position(&self, position: AgentPosition) -> bool {
        self.position == Some(position)
    }

    /// Human-readable label used in logs, e.g. `claude/security`.
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.provider.as_ref().map_or("?", |p| p.as_str()),
            self.role.map_or("?", |r| r.as_str())
        )
    }
}

/// An execution plan for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiAgentConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub strategy: Option<AnalysisStrategy>,
    /// Ordered agents; the first one must be the primary
    pub agents: Vec<AgentConfig>,
    pub fallback_enabled: bool,
    pub fallback_agents: Vec<AgentConfig>,
    pub fallback_timeout_ms: u64,
    pub max_concurrent_agents: usize,
    pub combine_results: bool,
}

impl Default for MultiAgentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            strategy: None,
            agents: Vec::new(),
            fallback_enabled: false,
            fallback_agents: Vec::new(),
            fallback_timeout_ms: DEFAULT_FALLBACK_TIMEOUT_MS,
            max_concurrent_agents: DEFAULT_MAX_CONCURRENT_AGENTS,
            combine_results: true,
        }
    }
}

impl MultiAgentConfig {
    pub fn new(name: impl Into<String>, strategy: AnalysisStrategy) -> Self {
        Self {
            name: name.into(),
            strategy: Some(strategy),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_agents(mut self, agents: impl IntoIterator<Item = AgentConfig>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Enable fallback with the given candidates, kept in descending priority order.
    pub fn with_fallback_agents(mut self, fallback_agents: Vec<AgentConfig>) -> Self {
        self.fallback_enabled = true;
        self.fallback_agents = fallback_agents;
        self.fallback_agents
            .sort_by(|a, b| b.priority.cmp(&a.priority));
        self
    }

    pub fn with_fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_concurrent_agents(mut self, max: usize) -> Self {
        self.max_concurrent_agents = max;
        self
    }

    pub fn with_combine_results(mut self, combine: bool) -> Self {
        self.combine_results = combine;
        self
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    pub fn primary(&self) -> Option<&AgentConfig> {
        self.agents.first()
    }

    /// The strategy that will be executed (missing or unknown run as parallel).
    pub fn effective_strategy(&self) -> AnalysisStrategy {
        self.strategy
            .as_ref()
            .map(AnalysisStrategy::effective)
            .unwrap_or_default()
    }

    /// Fallback candidates in the order they are tried.
    ///
    /// Descending priority; ties keep their declared order. A provider is
    /// tried at most once, through its highest-priority entry.
    pub fn fallback_candidates(&self) -> Vec<&AgentConfig> {
        let mut candidates: Vec<&AgentConfig> = self.fallback_agents.iter().collect();
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut seen = HashSet::new();
        candidates.retain(|a| a.provider.as_ref().is_none_or(|p| seen.insert(p)));
        candidates
    }

    /// Every provider used as primary or secondary.
    pub fn providers_in_use(&self) -> Vec<&Provider> {
        self.agents
            .iter()
            .filter(|a| {
                a.is_position(AgentPosition::Primary) || a.is_position(AgentPosition::Secondary)
            })
            .filter_map(|a| a.provider.as_ref())
            .collect()
    }
}

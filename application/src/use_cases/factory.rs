//! Multi-agent factory
//!
//! Assembles validated [`MultiAgentConfig`]s and instantiates the agents a
//! plan needs. Plan assembly fails fast with a [`ConfigurationError`];
//! agent instantiation never fails as a whole and instead reports each slot
//! it could not fill.

use crate::ports::agent::Agent;
use crate::ports::agent_factory::{AgentCreationError, AgentFactory};
use crate::ports::model_selector::ModelSelector;
use ensemble_domain::{
    AgentConfig, AgentPosition, AgentRole, AgentSelection, AnalysisStrategy, ConfigurationError,
    DEFAULT_FALLBACK_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_AGENTS, ErrorKind, ExecutionError,
    MultiAgentConfig, Provider, RepositoryContext, fallback_slot_name, validate_config,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options shared by the configuration builders
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    /// Overrides the generated `<role>-analysis` name
    pub name: Option<String>,
    pub description: Option<String>,
    pub strategy: AnalysisStrategy,
    pub fallback_enabled: bool,
    /// Explicit fallback candidates for [`MultiAgentFactory::create_configuration`]
    pub fallback_agents: Vec<AgentConfig>,
    pub fallback_timeout: Duration,
    pub max_concurrent_agents: usize,
    pub combine_results: bool,
    /// Extra roles to fill with secondary agents in [`MultiAgentFactory::create_adaptive_config`]
    pub secondary_roles: Vec<AgentRole>,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            strategy: AnalysisStrategy::Parallel,
            fallback_enabled: true,
            fallback_agents: Vec::new(),
            fallback_timeout: Duration::from_millis(DEFAULT_FALLBACK_TIMEOUT_MS),
            max_concurrent_agents: DEFAULT_MAX_CONCURRENT_AGENTS,
            combine_results: true,
            secondary_roles: Vec::new(),
        }
    }
}

impl ConfigOptions {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_strategy(mut self, strategy: AnalysisStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback_enabled = false;
        self
    }

    pub fn with_fallback_agents(mut self, fallback_agents: Vec<AgentConfig>) -> Self {
        self.fallback_agents = fallback_agents;
        self
    }

    pub fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_agents(mut self, max: usize) -> Self {
        self.max_concurrent_agents = max;
        self
    }

    pub fn with_secondary_roles(mut self, roles: impl IntoIterator<Item = AgentRole>) -> Self {
        self.secondary_roles = roles.into_iter().collect();
        self
    }

    fn apply(&self, mut config: MultiAgentConfig, fallback_agents: Vec<AgentConfig>) -> MultiAgentConfig {
        config.description = self.description.clone();
        config.fallback_timeout_ms = self.fallback_timeout.as_millis() as u64;
        config.max_concurrent_agents = self.max_concurrent_agents;
        config.combine_results = self.combine_results;
        if self.fallback_enabled {
            config = config.with_fallback_agents(fallback_agents);
        }
        config
    }
}

/// An agent the factory could not create
#[derive(Debug, Clone)]
pub struct SlotCreationFailure {
    /// Base slot the agent belongs to
    pub slot: String,
    /// Name the agent would have had (equal to `slot` for base agents)
    pub agent: String,
    pub provider: Option<Provider>,
    pub error: AgentCreationError,
}

impl SlotCreationFailure {
    pub fn to_execution_error(&self) -> ExecutionError {
        ExecutionError::new(
            self.slot.clone(),
            self.provider.clone(),
            ErrorKind::AgentCreation,
            format!("could not create agent '{}': {}", self.agent, self.error),
        )
    }
}

/// Agents instantiated for one plan, keyed by agent name
#[derive(Default)]
pub struct CreatedAgents {
    pub agents: HashMap<String, Arc<dyn Agent>>,
    pub failures: Vec<SlotCreationFailure>,
}

impl CreatedAgents {
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.get(name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Fallback candidates for a plan whose primary/secondary providers are `used`.
///
/// Walks [`Provider::FALLBACK_PREFERENCE`], skipping used providers. With
/// `n` candidates left, candidate `i` gets priority `n - i`, so the most
/// preferred untried provider is tried first.
pub fn derive_fallback_agents(role: AgentRole, used: &[&Provider]) -> Vec<AgentConfig> {
    let remaining: Vec<Provider> = Provider::FALLBACK_PREFERENCE
        .into_iter()
        .filter(|p| !used.contains(&p))
        .collect();
    let count = remaining.len() as i32;
    remaining
        .into_iter()
        .enumerate()
        .map(|(index, provider)| AgentConfig::fallback(provider, role, count - index as i32))
        .collect()
}

/// Builds plans and the agents they need
#[derive(Clone)]
pub struct MultiAgentFactory {
    agent_factory: Arc<dyn AgentFactory>,
    selector: Option<Arc<dyn ModelSelector>>,
}

impl MultiAgentFactory {
    pub fn new(agent_factory: Arc<dyn AgentFactory>) -> Self {
        Self {
            agent_factory,
            selector: None,
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn ModelSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn agent_factory(&self) -> &Arc<dyn AgentFactory> {
        &self.agent_factory
    }

    /// Plan with `primary` followed by `secondaries`, all playing `role`.
    ///
    /// `options.fallback_agents` are attached only when fallback is enabled.
    pub fn create_configuration(
        &self,
        role: AgentRole,
        primary: Provider,
        secondaries: &[Provider],
        options: &ConfigOptions,
    ) -> Result<MultiAgentConfig, ConfigurationError> {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| format!("{}-analysis", role));

        let config = MultiAgentConfig::new(name, options.strategy.clone())
            .with_agent(AgentConfig::primary(primary, role))
            .with_agents(
                secondaries
                    .iter()
                    .map(|p| AgentConfig::secondary(p.clone(), role)),
            );

        finalize(options.apply(config, options.fallback_agents.clone()))
    }

    /// Plan whose fallbacks are derived from the providers it does not use yet.
    pub fn create_config_with_fallbacks(
        &self,
        name: impl Into<String>,
        strategy: AnalysisStrategy,
        primary: &AgentSelection,
        secondaries: &[AgentSelection],
        options: &ConfigOptions,
    ) -> Result<MultiAgentConfig, ConfigurationError> {
        let config = MultiAgentConfig::new(name, strategy)
            .with_agent(primary.to_agent_config(AgentPosition::Primary))
            .with_agents(
                secondaries
                    .iter()
                    .map(|s| s.to_agent_config(AgentPosition::Secondary)),
            );

        let fallbacks = derive_fallback_agents(primary.role, &config.providers_in_use());
        debug!(
            "Derived {} fallback candidate(s) for '{}'",
            fallbacks.len(),
            config.name
        );

        finalize(options.apply(config, fallbacks))
    }

    /// Plan whose providers are chosen by the injected [`ModelSelector`].
    pub async fn create_adaptive_config(
        &self,
        role: AgentRole,
        context: &RepositoryContext,
        options: &ConfigOptions,
    ) -> Result<MultiAgentConfig, ConfigurationError> {
        let selector = self
            .selector
            .as_ref()
            .ok_or(ConfigurationError::NoSelection(role))?;

        let primary = selector
            .select(role, context)
            .await
            .ok_or(ConfigurationError::NoSelection(role))?;

        let mut secondaries = Vec::new();
        for secondary_role in &options.secondary_roles {
            match selector.select(*secondary_role, context).await {
                Some(selection) => secondaries.push(selection),
                None => warn!("No provider selected for secondary role {}", secondary_role),
            }
        }

        info!(
            "Adaptive selection for {}: primary {}, {} secondary agent(s)",
            role,
            primary.provider,
            secondaries.len()
        );

        let name = options
            .name
            .clone()
            .unwrap_or_else(|| format!("adaptive-{}-analysis", role));
        self.create_config_with_fallbacks(
            name,
            options.strategy.clone(),
            &primary,
            &secondaries,
            options,
        )
    }

    /// Instantiate one agent per base slot and, when fallback is enabled,
    /// one per (base slot, fallback candidate) pair.
    ///
    /// Fallback agents play the role of the slot they substitute for.
    pub async fn create_agents(&self, config: &MultiAgentConfig) -> CreatedAgents {
        let mut created = CreatedAgents::default();
        let candidates = if config.fallback_enabled {
            config.fallback_candidates()
        } else {
            Vec::new()
        };

        for slot in config.slots() {
            self.create_into(&mut created, &slot.name, &slot.name, &slot.agent, slot.agent.role)
                .await;

            for candidate in &candidates {
                let Some(provider) = &candidate.provider else {
                    continue;
                };
                let agent_name = fallback_slot_name(&slot.name, provider);
                let role = slot.agent.role.or(candidate.role);
                self.create_into(&mut created, &slot.name, &agent_name, candidate, role)
                    .await;
            }
        }

        debug!(
            "Created {} agent(s), {} failure(s) for '{}'",
            created.len(),
            created.failures.len(),
            config.name
        );
        created
    }

    async fn create_into(
        &self,
        created: &mut CreatedAgents,
        slot: &str,
        agent_name: &str,
        agent: &AgentConfig,
        role: Option<AgentRole>,
    ) {
        let result = match (role, agent.provider.as_ref()) {
            (None, _) => Err(AgentCreationError::MissingField("role")),
            (_, None) => Err(AgentCreationError::MissingField("provider")),
            (Some(role), Some(provider)) => {
                self.agent_factory.create_agent(role, provider, agent).await
            }
        };

        match result {
            Ok(instance) => {
                created.agents.insert(agent_name.to_string(), instance);
            }
            Err(error) => {
                warn!("Could not create agent {}: {}", agent_name, error);
                created.failures.push(SlotCreationFailure {
                    slot: slot.to_string(),
                    agent: agent_name.to_string(),
                    provider: agent.provider.clone(),
                    error,
                });
            }
        }
    }
}

fn finalize(config: MultiAgentConfig) -> Result<MultiAgentConfig, ConfigurationError> {
    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!("Configuration '{}': {}", config.name, warning.message);
    }
    if report.has_errors() {
        return Err(ConfigurationError::Invalid {
            name: config.name,
            issues: report.errors,
        });
    }
    Ok(config)
}

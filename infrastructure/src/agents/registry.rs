//! Provider-keyed agent registry
//!
//! [`AgentRegistry`] implements the [`AgentFactory`] port by dispatching on
//! the requested [`Provider`]. Registries are plain values built by the
//! caller and injected into the engine.

use super::command::CommandAgent;
use crate::config::FileConfig;
use async_trait::async_trait;
use ensemble_application::{Agent, AgentCreationError, AgentFactory};
use ensemble_domain::{AgentConfig, AgentRole, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds agents for one provider
pub trait AgentConstructor: Send + Sync {
    fn construct(
        &self,
        role: AgentRole,
        provider: &Provider,
        config: &AgentConfig,
    ) -> Result<Arc<dyn Agent>, AgentCreationError>;
}

impl<F> AgentConstructor for F
where
    F: Fn(AgentRole, &Provider, &AgentConfig) -> Result<Arc<dyn Agent>, AgentCreationError>
        + Send
        + Sync,
{
    fn construct(
        &self,
        role: AgentRole,
        provider: &Provider,
        config: &AgentConfig,
    ) -> Result<Arc<dyn Agent>, AgentCreationError> {
        self(role, provider, config)
    }
}

#[derive(Default, Clone)]
pub struct AgentRegistry {
    constructors: HashMap<Provider, Arc<dyn AgentConstructor>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`CommandAgent`] for every `[providers.<name>]` entry.
    pub fn from_config(config: &FileConfig) -> Self {
        let mut registry = Self::new();
        for (name, settings) in &config.providers {
            let provider = Provider::from(name.as_str());
            let settings = settings.clone();
            debug!("Registering command agent for {}: {}", provider, settings.command);
            registry.register(
                provider,
                move |role: AgentRole,
                      provider: &Provider,
                      agent: &AgentConfig|
                      -> Result<Arc<dyn Agent>, AgentCreationError> {
                    Ok(Arc::new(CommandAgent::new(&settings, role, provider.clone(), agent)))
                },
            );
        }
        registry
    }

    pub fn register(&mut self, provider: Provider, constructor: impl AgentConstructor + 'static) {
        self.constructors.insert(provider, Arc::new(constructor));
    }

    pub fn with(mut self, provider: Provider, constructor: impl AgentConstructor + 'static) -> Self {
        self.register(provider, constructor);
        self
    }

    pub fn supports(&self, provider: &Provider) -> bool {
        self.constructors.contains_key(provider)
    }

    /// Registered providers, sorted
    pub fn providers(&self) -> Vec<&Provider> {
        let mut providers: Vec<_> = self.constructors.keys().collect();
        providers.sort();
        providers
    }
}

#[async_trait]
impl AgentFactory for AgentRegistry {
    async fn create_agent(
        &self,
        role: AgentRole,
        provider: &Provider,
        config: &AgentConfig,
    ) -> Result<Arc<dyn Agent>, AgentCreationError> {
        let constructor = self
            .constructors
            .get(provider)
            .ok_or_else(|| AgentCreationError::UnsupportedProvider(provider.clone()))?;
        constructor.construct(role, provider, config)
    }
}

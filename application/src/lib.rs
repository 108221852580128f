//! Application layer for agent-ensemble
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent::{Agent, AgentError},
    agent_factory::{AgentCreationError, AgentFactory},
    model_selector::ModelSelector,
    progress::{CompositeProgress, ExecutionProgress, NoProgress},
};
pub use use_cases::availability::{AvailabilityReport, validate_agent_availability};
pub use use_cases::execute_analysis::MultiAgentExecutor;
pub use use_cases::factory::{
    ConfigOptions, CreatedAgents, MultiAgentFactory, SlotCreationFailure, derive_fallback_agents,
};
pub use use_cases::selection_cache::CachedSelector;

//! Availability pre-flight
//!
//! Checks that the agents a plan depends on can actually be created before
//! a run is started. Purely advisory: the executor does not call it.

use crate::ports::agent_factory::AgentFactory;
use ensemble_domain::{AgentConfig, AgentPosition, ConfigIssue, ConfigIssueCode, MultiAgentConfig};
use serde::Serialize;
use tracing::debug;

/// Outcome of [`validate_agent_availability`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityReport {
    pub valid: bool,
    pub errors: Vec<ConfigIssue>,
}

/// Try to create the primary agent and, when no fallback could cover for
/// them, every secondary agent.
pub async fn validate_agent_availability(
    config: &MultiAgentConfig,
    factory: &dyn AgentFactory,
) -> AvailabilityReport {
    let mut errors = Vec::new();

    match config.primary() {
        Some(primary) => {
            if let Err(reason) = try_create(primary, factory).await {
                errors.push(ConfigIssue::error(
                    ConfigIssueCode::PrimaryUnavailable,
                    format!("cannot create primary agent {}: {}", primary.label(), reason),
                ));
            }
        }
        None => errors.push(ConfigIssue::error(
            ConfigIssueCode::PrimaryUnavailable,
            "cannot create primary agent: no agents are configured",
        )),
    }

    if !config.fallback_enabled {
        for (index, agent) in config
            .agents
            .iter()
            .filter(|a| a.is_position(AgentPosition::Secondary))
            .enumerate()
        {
            if let Err(reason) = try_create(agent, factory).await {
                errors.push(ConfigIssue::error(
                    ConfigIssueCode::SecondaryUnavailable,
                    format!(
                        "cannot create secondary agent {} ({}): {}",
                        index,
                        agent.label(),
                        reason
                    ),
                ));
            }
        }
    } else {
        debug!("Fallback enabled; secondary agents are not checked");
    }

    AvailabilityReport {
        valid: errors.is_empty(),
        errors,
    }
}

async fn try_create(agent: &AgentConfig, factory: &dyn AgentFactory) -> Result<(), String> {
    let (Some(role), Some(provider)) = (agent.role, agent.provider.as_ref()) else {
        return Err("provider and role are required".to_string());
    };
    factory
        .create_agent(role, provider, agent)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

//! Slot naming
//!
//! A slot is a named position in a plan that ends with exactly one terminal
//! outcome. Base slots come from the non-fallback agents; fallback agents are
//! instantiated once per base slot and looked up by naming convention.

use crate::agent::config::{AgentConfig, AgentPosition, MultiAgentConfig};
use crate::core::provider::Provider;

pub const PRIMARY_SLOT: &str = "primary";

/// A base slot and the agent configured for it
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlan {
    pub name: String,
    pub agent: AgentConfig,
}

impl SlotPlan {
    pub fn is_primary(&self) -> bool {
        self.agent.is_position(AgentPosition::Primary)
    }

    pub fn is_specialist(&self) -> bool {
        self.agent.is_position(AgentPosition::Specialist)
    }
}

/// Name of the agent that substitutes `provider` for `base_slot`.
pub fn fallback_slot_name(base_slot: &str, provider: &Provider) -> String {
    format!("fallback-for-{}-{}", base_slot, provider)
}

impl MultiAgentConfig {
    /// Base slots in declared order.
    ///
    /// The first primary is `primary`, further ones `primary-1`, ...;
    /// secondaries are `secondary-0`, `secondary-1`, ...; specialists
    /// `specialist-0`, .... Fallback-position entries and agents without a
    /// position are not slots.
    pub fn slots(&self) -> Vec<SlotPlan> {
        let mut primaries = 0usize;
        let mut secondaries = 0usize;
        let mut specialists = 0usize;

        self.agents
            .iter()
            .filter_map(|agent| {
                let name = match agent.position? {
                    AgentPosition::Primary => {
                        primaries += 1;
                        if primaries == 1 {
                            PRIMARY_SLOT.to_string()
                        } else {
                            format!("{}-{}", PRIMARY_SLOT, primaries - 1)
                        }
                    }
                    AgentPosition::Secondary => {
                        secondaries += 1;
                        format!("secondary-{}", secondaries - 1)
                    }
                    AgentPosition::Specialist => {
                        specialists += 1;
                        format!("specialist-{}", specialists - 1)
                    }
                    AgentPosition::Fallback => return None,
                };
                Some(SlotPlan {
                    name,
                    agent: agent.clone(),
                })
            })
            .collect()
    }
}

//! Domain layer for agent-ensemble
//!
//! This crate contains the plan model, its validation, and the report types.
//! It has no dependencies on infrastructure or runtime concerns.
//!
//! # Core Concepts
//!
//! ## Plans
//!
//! A [`MultiAgentConfig`] names a primary agent, optional secondary and
//! specialist agents, and a priority-ordered list of fallback agents that
//! substitute for any slot whose agent fails or times out.
//!
//! ## Slots
//!
//! Each non-fallback agent occupies a named slot (`primary`,
//! `secondary-0`, ...). A slot ends with exactly one [`SlotResult`], and the
//! slot results are aggregated into an [`ExecutionReport`].

pub mod agent;
pub mod analysis;
pub mod core;
pub mod orchestration;
pub mod report;

// Re-export commonly used types
pub use agent::{
    config::{
        AgentConfig, AgentPosition, DEFAULT_FALLBACK_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_AGENTS,
        MultiAgentConfig,
    },
    slot::{PRIMARY_SLOT, SlotPlan, fallback_slot_name},
    validation::{
        ConfigIssue, ConfigIssueCode, Severity, ValidationReport, validate_agent_config,
        validate_config,
    },
};
pub use analysis::{
    context::{AgentSelection, RepositoryContext, RepositorySize},
    findings::{AgentOutput, EducationalNote, FindingSeverity, Insight, Suggestion},
    payload::{AnalysisInput, FileRecord, RepositoryPayload},
};
pub use core::{error::ConfigurationError, provider::Provider, role::AgentRole};
pub use orchestration::{entities::RunPhase, strategy::AnalysisStrategy};
pub use report::{
    entities::{AttemptRecord, ErrorKind, ExecutionError, SlotResult},
    execution_report::{ExecutionReport, ReportBuilder},
};

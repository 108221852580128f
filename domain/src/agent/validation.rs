//! Structural validation for [`MultiAgentConfig`] and [`AgentConfig`].
//!
//! Validation never touches agents or the network: it only inspects the plan.
//! Issues carry a [`Severity`]; any `Error` blocks execution while
//! `Warning`s are informational.
//!
//! # Examples
//!
//! ```
//! use ensemble_domain::{AgentConfig, AgentRole, AnalysisStrategy, MultiAgentConfig, Provider};
//! use ensemble_domain::agent::validation::validate_config;
//!
//! let config = MultiAgentConfig::new("review", AnalysisStrategy::Parallel)
//!     .with_agent(AgentConfig::primary(Provider::Claude, AgentRole::CodeQuality));
//! let report = validate_config(&config);
//! assert!(report.valid);
//! ```

use crate::agent::config::{AgentConfig, AgentPosition, MultiAgentConfig};
use crate::orchestration::strategy::AnalysisStrategy;
use serde::Serialize;
use std::ops::RangeInclusive;

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=1.0;

pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 100..=100_000;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fatal: the plan cannot be executed.
    Error,
    /// Non-fatal: the plan runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigIssueCode {
    MissingName,
    MissingStrategy,
    /// Strategy value is not recognized and will execute as parallel.
    UnknownStrategy,
    NoAgents,
    FirstAgentNotPrimary,
    MissingProvider,
    MissingRole,
    MissingPosition,
    TemperatureOutOfRange,
    MaxTokensOutOfRange,
    /// An entry of the fallback list is not in the fallback position.
    FallbackPositionMismatch,
    SecondaryWithoutPrimary,
    FallbackWithoutCandidates,
    SpecializedWithoutSpecialist,
    SpecialistWithoutFocusAreas,
    /// The same provider appears more than once in the fallback list.
    DuplicateFallbackProvider,
    /// A zero fallback timeout fails every attempt before it starts.
    ZeroFallbackTimeout,
    PrimaryUnavailable,
    SecondaryUnavailable,
}

/// A detected issue in a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    fn prefixed(mut self, prefix: &str) -> Self {
        self.message = format!("{}: {}", prefix, self.message);
        self
    }
}

/// Outcome of [`validate_config`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ConfigIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|i| i.severity == Severity::Error);
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Check one agent in isolation.
pub fn validate_agent_config(agent: &AgentConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if agent.provider.as_ref().is_none_or(|p| p.is_blank()) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::MissingProvider,
            "provider is required",
        ));
    }

    if agent.role.is_none() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::MissingRole,
            "role is required",
        ));
    }

    if agent.position.is_none() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::MissingPosition,
            "position is required",
        ));
    }

    // NaN fails `contains`, so it is rejected as well.
    if !TEMPERATURE_RANGE.contains(&agent.temperature) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::TemperatureOutOfRange,
            format!(
                "temperature must be between {} and {}, got {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end(),
                agent.temperature
            ),
        ));
    }

    if !MAX_TOKENS_RANGE.contains(&agent.max_tokens) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::MaxTokensOutOfRange,
            format!(
                "max_tokens must be between {} and {}, got {}",
                MAX_TOKENS_RANGE.start(),
                MAX_TOKENS_RANGE.end(),
                agent.max_tokens
            ),
        ));
    }

    issues
}

/// Check a whole plan.
pub fn validate_config(config: &MultiAgentConfig) -> ValidationReport {
    let mut issues = Vec::new();

    if config.name.trim().is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::MissingName,
            "name is required",
        ));
    }

    match &config.strategy {
        None => issues.push(ConfigIssue::error(
            ConfigIssueCode::MissingStrategy,
            "strategy is required",
        )),
        Some(AnalysisStrategy::Unknown(value)) if value.is_empty() => {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingStrategy,
                "strategy is required",
            ))
        }
        Some(AnalysisStrategy::Unknown(value)) => issues.push(ConfigIssue::warning(
            ConfigIssueCode::UnknownStrategy,
            format!("unknown strategy '{}' will execute as parallel", value),
        )),
        Some(_) => {}
    }

    if config.agents.is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::NoAgents,
            "at least one agent is required",
        ));
    } else if !config.agents[0].is_position(AgentPosition::Primary) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::FirstAgentNotPrimary,
            "the first agent must be in the primary position",
        ));
    }

    for (index, agent) in config.agents.iter().enumerate() {
        let prefix = format!("agent {}", index);
        issues.extend(
            validate_agent_config(agent)
                .into_iter()
                .map(|i| i.prefixed(&prefix)),
        );
    }

    for (index, agent) in config.fallback_agents.iter().enumerate() {
        let prefix = format!("fallback agent {}", index);
        if agent.position.is_some() && !agent.is_position(AgentPosition::Fallback) {
            issues.push(
                ConfigIssue::error(
                    ConfigIssueCode::FallbackPositionMismatch,
                    "fallback agents must be in the fallback position",
                )
                .prefixed(&prefix),
            );
        }
        issues.extend(
            validate_agent_config(agent)
                .into_iter()
                .map(|i| i.prefixed(&prefix)),
        );
    }

    let mut fallback_providers = Vec::new();
    for agent in &config.fallback_agents {
        let Some(provider) = &agent.provider else {
            continue;
        };
        if fallback_providers.contains(&provider) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::DuplicateFallbackProvider,
                format!(
                    "fallback provider '{}' is listed more than once; only its highest-priority entry is used",
                    provider
                ),
            ));
        } else {
            fallback_providers.push(provider);
        }
    }

    if config.fallback_timeout_ms == 0 {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::ZeroFallbackTimeout,
            "fallback_timeout_ms must be greater than 0",
        ));
    }

    let has_position = |position| config.agents.iter().any(|a| a.is_position(position));

    if has_position(AgentPosition::Secondary) && !has_position(AgentPosition::Primary) {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::SecondaryWithoutPrimary,
            "secondary agents are configured without a primary agent",
        ));
    }

    if config.fallback_enabled && config.fallback_agents.is_empty() {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::FallbackWithoutCandidates,
            "fallback is enabled but no fallback agents are configured",
        ));
    }

    if config.strategy == Some(AnalysisStrategy::Specialized) {
        if !has_position(AgentPosition::Specialist) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::SpecializedWithoutSpecialist,
                "specialized strategy without any specialist agent",
            ));
        }
        for (index, agent) in config.agents.iter().enumerate() {
            if agent.is_position(AgentPosition::Specialist) && agent.focus_areas.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::SpecialistWithoutFocusAreas,
                    format!("agent {}: specialist agent has no focus areas", index),
                ));
            }
        }
    }

    ValidationReport::from_issues(issues)
}

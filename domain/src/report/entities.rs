//! Per-slot records folded into an [`ExecutionReport`](super::ExecutionReport)

use crate::analysis::findings::AgentOutput;
use crate::core::provider::Provider;
use crate::core::role::AgentRole;
use serde::{Deserialize, Serialize};

/// Category of a recorded run-time failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The factory could not instantiate an agent
    AgentCreation,
    /// `analyze()` returned an error (or panicked)
    AgentInvocation,
    /// `analyze()` did not finish within the fallback timeout
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::AgentCreation => "agent creation",
            ErrorKind::AgentInvocation => "agent invocation",
            ErrorKind::Timeout => "timeout",
        };
        write!(f, "{}", s)
    }
}

/// A failure recorded in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionError {
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ExecutionError {
    pub fn new(
        slot: impl Into<String>,
        provider: Option<Provider>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            slot: slot.into(),
            provider,
            kind,
            message: message.into(),
        }
    }
}

/// One `analyze()` attempt within a slot's fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Name of the agent that was invoked (base slot or fallback name)
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptRecord {
    pub fn succeeded(agent: impl Into<String>, provider: Option<Provider>, duration_ms: u64) -> Self {
        Self {
            agent: agent.into(),
            provider,
            success: true,
            duration_ms,
            error_kind: None,
            error: None,
        }
    }

    pub fn failed(
        agent: impl Into<String>,
        provider: Option<Provider>,
        duration_ms: u64,
        kind: ErrorKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            provider,
            success: false,
            duration_ms,
            error_kind: Some(kind),
            error: Some(error.into()),
        }
    }
}

/// Terminal outcome of one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotResult {
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AgentRole>,
    /// Provider that produced the terminal outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub success: bool,
    /// True when the terminal success came from a fallback agent
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<AgentOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: Vec<AttemptRecord>,
    pub duration_ms: u64,
}

impl SlotResult {
    pub fn success(
        slot: impl Into<String>,
        role: Option<AgentRole>,
        provider: Option<Provider>,
        output: AgentOutput,
        used_fallback: bool,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let duration_ms = attempts.iter().map(|a| a.duration_ms).sum();
        Self {
            slot: slot.into(),
            role,
            provider,
            success: true,
            used_fallback,
            output: Some(output),
            error: None,
            attempts,
            duration_ms,
        }
    }

    /// Every candidate failed (or none could be created).
    pub fn exhausted(
        slot: impl Into<String>,
        role: Option<AgentRole>,
        provider: Option<Provider>,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let duration_ms = attempts.iter().map(|a| a.duration_ms).sum();
        let error = attempts
            .last()
            .and_then(|a| a.error.clone())
            .unwrap_or_else(|| "no agent could be created for this slot".to_string());
        Self {
            slot: slot.into(),
            role,
            provider,
            success: false,
            used_fallback: false,
            output: None,
            error: Some(error),
            attempts,
            duration_ms,
        }
    }

    /// Findings of a successful slot (empty on failure).
    pub fn insights(&self) -> &[crate::analysis::findings::Insight] {
        self.output.as_ref().map_or(&[], |o| o.insights.as_slice())
    }

    /// The slot-level error to record when this slot is exhausted.
    pub fn to_execution_error(&self) -> Option<ExecutionError> {
        if self.success {
            return None;
        }
        let kind = self
            .attempts
            .last()
            .and_then(|a| a.error_kind)
            .unwrap_or(ErrorKind::AgentCreation);
        Some(ExecutionError::new(
            self.slot.clone(),
            self.provider.clone(),
            kind,
            format!(
                "all {} attempt(s) failed; last error: {}",
                self.attempts.len(),
                self.error.as_deref().unwrap_or("unknown")
            ),
        ))
    }
}

//! The aggregated artifact of one execution run

use crate::analysis::findings::AgentOutput;
use crate::orchestration::strategy::AnalysisStrategy;
use crate::report::entities::{ExecutionError, SlotResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated result of a multi-agent run.
///
/// `successful` is true when at least one slot reached a success outcome,
/// whether from its base agent or from a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub analysis_id: String,
    pub config_name: String,
    /// The strategy that was executed
    pub strategy: AnalysisStrategy,
    pub repository: String,
    pub successful: bool,
    pub used_fallback: bool,
    pub results: BTreeMap<String, SlotResult>,
    pub errors: Vec<ExecutionError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined: Option<AgentOutput>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ExecutionReport {
    pub fn result(&self, slot: &str) -> Option<&SlotResult> {
        self.results.get(slot)
    }

    pub fn successful_slots(&self) -> impl Iterator<Item = &SlotResult> {
        self.results.values().filter(|r| r.success)
    }

    pub fn failed_slots(&self) -> impl Iterator<Item = &SlotResult> {
        self.results.values().filter(|r| !r.success)
    }
}

/// Accumulates slot outcomes as they reach a terminal state.
///
/// Owned by the run coordinator; each slot is recorded exactly once.
#[derive(Debug)]
pub struct ReportBuilder {
    analysis_id: String,
    config_name: String,
    strategy: AnalysisStrategy,
    repository: String,
    combine_results: bool,
    started_at: DateTime<Utc>,
    results: BTreeMap<String, SlotResult>,
    errors: Vec<ExecutionError>,
}

impl ReportBuilder {
    pub fn new(
        analysis_id: impl Into<String>,
        config_name: impl Into<String>,
        strategy: AnalysisStrategy,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            config_name: config_name.into(),
            strategy,
            repository: repository.into(),
            combine_results: false,
            started_at: Utc::now(),
            results: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn combine_results(mut self, combine: bool) -> Self {
        self.combine_results = combine;
        self
    }

    pub fn record_error(&mut self, error: ExecutionError) {
        self.errors.push(error);
    }

    /// Fold a terminal slot outcome; exhausted slots also add an error entry.
    pub fn record_slot(&mut self, result: SlotResult) {
        if let Some(error) = result.to_execution_error() {
            self.errors.push(error);
        }
        self.results.insert(result.slot.clone(), result);
    }

    pub fn recorded(&self, slot: &str) -> bool {
        self.results.contains_key(slot)
    }

    pub fn finish(self) -> ExecutionReport {
        let completed_at = Utc::now();
        let successful = self.results.values().any(|r| r.success);
        let used_fallback = self.results.values().any(|r| r.used_fallback);
        let combined = self.combine_results.then(|| {
            AgentOutput::combine(
                self.results
                    .iter()
                    .filter_map(|(slot, r)| r.output.as_ref().map(|o| (slot.as_str(), o))),
            )
        });
        let duration_ms = (completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;

        ExecutionReport {
            analysis_id: self.analysis_id,
            config_name: self.config_name,
            strategy: self.strategy,
            repository: self.repository,
            successful,
            used_fallback,
            results: self.results,
            errors: self.errors,
            combined,
            started_at: self.started_at,
            completed_at,
            duration_ms,
        }
    }
}

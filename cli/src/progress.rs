//! Progress reporting for execution runs
//!
//! Mirrors engine callbacks into the tracing log so that `-v` shows the
//! run as it happens.

use ensemble_application::{AgentError, ExecutionProgress};
use ensemble_domain::{RunPhase, SlotResult};
use tracing::{info, warn};

pub struct LogProgress;

impl ExecutionProgress for LogProgress {
    fn on_phase(&self, analysis_id: &str, phase: RunPhase) {
        info!("[{}] {}", analysis_id, phase.display_name());
    }

    fn on_slot_complete(&self, analysis_id: &str, result: &SlotResult) {
        if result.success {
            info!(
                "[{}] {} done: {} insight(s){}",
                analysis_id,
                result.slot,
                result.insights().len(),
                if result.used_fallback { " via fallback" } else { "" }
            );
        } else {
            warn!(
                "[{}] {} failed: {}",
                analysis_id,
                result.slot,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    fn on_attempt_failed(&self, analysis_id: &str, slot: &str, agent: &str, error: &AgentError) {
        warn!("[{}] {} attempt by {} failed: {}", analysis_id, slot, agent, error);
    }

    fn on_fallback(&self, analysis_id: &str, slot: &str, fallback_agent: &str) {
        info!("[{}] {} -> {}", analysis_id, slot, fallback_agent);
    }
}

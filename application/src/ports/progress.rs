//! Progress notification port
//!
//! Defines the interface for reporting progress during an execution run.
//! Callbacks may arrive from several slot tasks at once.

use super::agent::AgentError;
use ensemble_domain::{RunPhase, SlotResult};
use std::sync::Arc;

/// Callback for progress updates during execution
///
/// Implementations live in outer layers and can display or record progress
/// in various ways (logs, JSONL files, UIs).
pub trait ExecutionProgress: Send + Sync {
    /// Called when the run enters a new phase
    fn on_phase(&self, analysis_id: &str, phase: RunPhase);

    /// Called when a slot reaches its terminal outcome
    fn on_slot_complete(&self, analysis_id: &str, result: &SlotResult);

    /// Called before a slot's first attempt
    fn on_slot_start(&self, _analysis_id: &str, _slot: &str, _agent: &str) {}

    /// Called when one attempt of a slot fails or times out
    fn on_attempt_failed(&self, _analysis_id: &str, _slot: &str, _agent: &str, _error: &AgentError) {}

    /// Called when a fallback agent is about to substitute for a slot
    fn on_fallback(&self, _analysis_id: &str, _slot: &str, _fallback_agent: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ExecutionProgress for NoProgress {
    fn on_phase(&self, _analysis_id: &str, _phase: RunPhase) {}
    fn on_slot_complete(&self, _analysis_id: &str, _result: &SlotResult) {}
}

/// Fans every event out to several notifiers.
pub struct CompositeProgress {
    delegates: Vec<Arc<dyn ExecutionProgress>>,
}

impl CompositeProgress {
    pub fn new(delegates: Vec<Arc<dyn ExecutionProgress>>) -> Self {
        Self { delegates }
    }
}

macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl ExecutionProgress for CompositeProgress {
    fn on_phase(&self, analysis_id: &str, phase: RunPhase) {
        delegate!(self, on_phase, analysis_id, phase);
    }

    fn on_slot_complete(&self, analysis_id: &str, result: &SlotResult) {
        delegate!(self, on_slot_complete, analysis_id, result);
    }

    fn on_slot_start(&self, analysis_id: &str, slot: &str, agent: &str) {
        delegate!(self, on_slot_start, analysis_id, slot, agent);
    }

    fn on_attempt_failed(&self, analysis_id: &str, slot: &str, agent: &str, error: &AgentError) {
        delegate!(self, on_attempt_failed, analysis_id, slot, agent, error);
    }

    fn on_fallback(&self, analysis_id: &str, slot: &str, fallback_agent: &str) {
        delegate!(self, on_fallback, analysis_id, slot, fallback_agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<RunPhase>>,
        fallbacks: Mutex<Vec<String>>,
    }

    impl ExecutionProgress for RecordingProgress {
        fn on_phase(&self, _analysis_id: &str, phase: RunPhase) {
            self.phases.lock().unwrap().push(phase);
        }

        fn on_slot_complete(&self, _analysis_id: &str, _result: &SlotResult) {}

        fn on_fallback(&self, _analysis_id: &str, _slot: &str, fallback_agent: &str) {
            self.fallbacks.lock().unwrap().push(fallback_agent.to_string());
        }
    }

    #[test]
    fn composite_forwards_to_every_delegate() {
        let a = Arc::new(RecordingProgress::default());
        let b = Arc::new(RecordingProgress::default());
        let composite = CompositeProgress::new(vec![
            a.clone() as Arc<dyn ExecutionProgress>,
            b.clone() as Arc<dyn ExecutionProgress>,
        ]);

        composite.on_phase("run", RunPhase::Running);
        composite.on_fallback("run", "primary", "fallback-for-primary-openai");
        composite.on_slot_start("run", "primary", "claude/code_quality");

        for recorder in [&a, &b] {
            assert_eq!(*recorder.phases.lock().unwrap(), vec![RunPhase::Running]);
            assert_eq!(
                *recorder.fallbacks.lock().unwrap(),
                vec!["fallback-for-primary-openai".to_string()]
            );
        }
    }
}

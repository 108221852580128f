//! Execute Analysis use case
//!
//! Runs a validated plan against a repository payload. Every slot ends with
//! exactly one [`SlotResult`]; failures are captured per slot and folded into
//! the [`ExecutionReport`], so [`MultiAgentExecutor::execute`] never fails.

use crate::ports::agent::{Agent, AgentError};
use crate::ports::agent_factory::AgentFactory;
use crate::ports::progress::{ExecutionProgress, NoProgress};
use crate::use_cases::factory::MultiAgentFactory;
use ensemble_domain::{
    AgentOutput, AnalysisInput, AnalysisStrategy, AttemptRecord, ConfigurationError, ErrorKind,
    ExecutionReport, MultiAgentConfig, Provider, ReportBuilder, RepositoryPayload, RunPhase,
    SlotPlan, SlotResult, fallback_slot_name, validate_config,
};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Orchestrates one plan: agent creation, strategy dispatch, fallback and
/// aggregation.
pub struct MultiAgentExecutor {
    config: Arc<MultiAgentConfig>,
    factory: MultiAgentFactory,
    payload: Arc<RepositoryPayload>,
    progress: Arc<dyn ExecutionProgress>,
}

impl MultiAgentExecutor {
    /// Validate `config` and prepare a run. Nothing is executed yet.
    pub fn new(
        config: MultiAgentConfig,
        agent_factory: Arc<dyn AgentFactory>,
        payload: RepositoryPayload,
    ) -> Result<Self, ConfigurationError> {
        let report = validate_config(&config);
        for warning in &report.warnings {
            warn!("Configuration '{}': {}", config.name, warning.message);
        }
        if report.has_errors() {
            return Err(ConfigurationError::Invalid {
                name: config.name,
                issues: report.errors,
            });
        }

        Ok(Self {
            config: Arc::new(config),
            factory: MultiAgentFactory::new(agent_factory),
            payload: Arc::new(payload),
            progress: Arc::new(NoProgress),
        })
    }

    pub fn with_progress(mut self, progress: Arc<dyn ExecutionProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &MultiAgentConfig {
        &self.config
    }

    /// Run every slot per the plan's strategy and aggregate the outcomes.
    pub async fn execute(&self) -> ExecutionReport {
        let analysis_id = Uuid::new_v4().to_string();
        let strategy = self.config.effective_strategy();
        self.enter_phase(&analysis_id, RunPhase::Init);

        if let Some(AnalysisStrategy::Unknown(value)) = &self.config.strategy {
            warn!(
                "Unknown strategy '{}' in '{}', executing as parallel",
                value, self.config.name
            );
        }
        info!(
            "Starting analysis {} of {} with plan '{}' ({})",
            analysis_id,
            self.payload.display_name(),
            self.config.name,
            strategy
        );

        let mut builder = ReportBuilder::new(
            analysis_id.clone(),
            self.config.name.clone(),
            strategy.clone(),
            self.payload.display_name(),
        )
        .combine_results(self.config.combine_results);

        let created = self.factory.create_agents(&self.config).await;
        for failure in &created.failures {
            builder.record_error(failure.to_execution_error());
        }

        let runner = SlotRunner {
            analysis_id: Arc::from(analysis_id.as_str()),
            agents: Arc::new(created.agents),
            fallbacks: Arc::new(self.fallback_providers()),
            limiter: Arc::new(Semaphore::new(self.config.max_concurrent_agents.max(1))),
            timeout: self.config.fallback_timeout(),
            progress: Arc::clone(&self.progress),
        };

        let slots = self.config.slots();
        self.enter_phase(&analysis_id, RunPhase::Running);
        match strategy {
            AnalysisStrategy::Sequential => self.run_sequential(&runner, slots, &mut builder).await,
            AnalysisStrategy::Specialized => {
                self.run_concurrent(&runner, slots, true, &mut builder).await
            }
            _ => self.run_concurrent(&runner, slots, false, &mut builder).await,
        }

        self.enter_phase(&analysis_id, RunPhase::Aggregating);
        let report = builder.finish();
        self.enter_phase(&analysis_id, RunPhase::Done);

        info!(
            "Analysis {} finished in {}ms: {} succeeded, {} failed{}",
            report.analysis_id,
            report.duration_ms,
            report.successful_slots().count(),
            report.failed_slots().count(),
            if report.used_fallback {
                " (fallback used)"
            } else {
                ""
            }
        );
        report
    }

    fn enter_phase(&self, analysis_id: &str, phase: RunPhase) {
        debug!("Analysis {}: {}", analysis_id, phase.display_name());
        self.progress.on_phase(analysis_id, phase);
    }

    fn fallback_providers(&self) -> Vec<Provider> {
        if !self.config.fallback_enabled {
            return Vec::new();
        }
        self.config
            .fallback_candidates()
            .into_iter()
            .filter_map(|a| a.provider.clone())
            .collect()
    }

    fn input_for(&self, slot: &SlotPlan, scoped: bool) -> AnalysisInput {
        let payload = if scoped && slot.is_specialist() {
            let scoped_payload = self.payload.scoped_to(&slot.agent.focus_areas);
            debug!(
                "Slot {} scoped to {} of {} file(s)",
                slot.name,
                scoped_payload.files.len(),
                self.payload.files.len()
            );
            scoped_payload
        } else {
            self.payload.as_ref().clone()
        };
        AnalysisInput::new(&slot.name, &slot.agent, payload)
    }

    fn complete_slot(&self, runner: &SlotRunner, builder: &mut ReportBuilder, result: SlotResult) {
        self.progress.on_slot_complete(&runner.analysis_id, &result);
        builder.record_slot(result);
    }

    /// Parallel and specialized strategies: every slot runs at once, bounded
    /// only by the concurrency limiter.
    async fn run_concurrent(
        &self,
        runner: &SlotRunner,
        slots: Vec<SlotPlan>,
        scoped: bool,
        builder: &mut ReportBuilder,
    ) {
        let mut join_set = JoinSet::new();
        for slot in &slots {
            let input = self.input_for(slot, scoped);
            let runner = runner.clone();
            let slot = slot.clone();
            join_set.spawn(async move { runner.run(&slot, input).await });
        }

        let mut join_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => self.complete_slot(runner, builder, result),
                Err(e) => {
                    warn!("Task join error: {}", e);
                    join_error = Some(e.to_string());
                }
            }
        }

        // A slot task that died outside `analyze()` still gets its terminal outcome.
        let missing: Vec<&SlotPlan> = slots.iter().filter(|s| !builder.recorded(&s.name)).collect();
        for slot in missing {
            let message = join_error
                .clone()
                .unwrap_or_else(|| "slot task ended without a result".to_string());
            let result = SlotResult::exhausted(
                &slot.name,
                slot.agent.role,
                slot.agent.provider.clone(),
                vec![AttemptRecord::failed(
                    &slot.name,
                    slot.agent.provider.clone(),
                    0,
                    ErrorKind::AgentInvocation,
                    message,
                )],
            );
            self.complete_slot(runner, builder, result);
        }
    }

    /// Sequential strategy: the primary slot (with its fallback chain) runs
    /// first, then every other slot in declared order with the primary's
    /// output attached.
    async fn run_sequential(
        &self,
        runner: &SlotRunner,
        slots: Vec<SlotPlan>,
        builder: &mut ReportBuilder,
    ) {
        let mut primary_output: Option<AgentOutput> = None;
        let mut slots = slots.into_iter().peekable();

        if let Some(primary) = slots.next_if(|s| s.is_primary()) {
            let result = runner.run(&primary, self.input_for(&primary, false)).await;
            primary_output = result.output.clone();
            if primary_output.is_none() {
                warn!("Primary slot failed; later slots run without its result");
            }
            self.complete_slot(runner, builder, result);
        }

        for slot in slots {
            let mut input = self.input_for(&slot, false);
            if let Some(output) = &primary_output {
                input = input.with_primary_result(output.clone());
            }
            let result = runner.run(&slot, input).await;
            self.complete_slot(runner, builder, result);
        }
    }
}

/// Per-run state shared by every slot task
#[derive(Clone)]
struct SlotRunner {
    analysis_id: Arc<str>,
    agents: Arc<HashMap<String, Arc<dyn Agent>>>,
    /// Fallback providers in the order they are tried (empty when disabled)
    fallbacks: Arc<Vec<Provider>>,
    limiter: Arc<Semaphore>,
    timeout: Duration,
    progress: Arc<dyn ExecutionProgress>,
}

impl SlotRunner {
    /// Walk the slot's chain (base agent, then fallbacks) until one succeeds.
    async fn run(&self, slot: &SlotPlan, input: AnalysisInput) -> SlotResult {
        let base = (slot.name.clone(), slot.agent.provider.clone(), false);
        let fallbacks = self
            .fallbacks
            .iter()
            .map(|p| (fallback_slot_name(&slot.name, p), Some(p.clone()), true));

        self.progress
            .on_slot_start(&self.analysis_id, &slot.name, &slot.agent.label());

        let mut attempts = Vec::new();
        let mut last_provider = slot.agent.provider.clone();

        for (agent_name, provider, is_fallback) in std::iter::once(base).chain(fallbacks) {
            let Some(agent) = self.agents.get(&agent_name) else {
                debug!("No agent {} for slot {}, skipping", agent_name, slot.name);
                continue;
            };
            if is_fallback {
                info!("Slot {} falling back to {}", slot.name, agent.name());
                self.progress
                    .on_fallback(&self.analysis_id, &slot.name, &agent_name);
            }

            let started = Instant::now();
            let outcome = self.attempt(agent.as_ref(), &input).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            last_provider = provider.clone();

            match outcome {
                Ok(output) => {
                    info!("Slot {} completed by {} in {}ms", slot.name, agent.name(), elapsed_ms);
                    attempts.push(AttemptRecord::succeeded(&agent_name, provider.clone(), elapsed_ms));
                    return SlotResult::success(
                        &slot.name,
                        slot.agent.role,
                        provider,
                        output,
                        is_fallback,
                        attempts,
                    );
                }
                Err(error) => {
                    warn!("Slot {} attempt by {} failed: {}", slot.name, agent.name(), error);
                    self.progress
                        .on_attempt_failed(&self.analysis_id, &slot.name, &agent_name, &error);
                    attempts.push(AttemptRecord::failed(
                        &agent_name,
                        provider,
                        elapsed_ms,
                        error.kind(),
                        error.to_string(),
                    ));
                }
            }
        }

        warn!("Slot {} exhausted after {} attempt(s)", slot.name, attempts.len());
        SlotResult::exhausted(&slot.name, slot.agent.role, last_provider, attempts)
    }

    /// One `analyze()` call under the concurrency limiter and the timeout.
    ///
    /// The permit is taken before the clock starts, so queueing never counts
    /// against the timeout.
    async fn attempt(&self, agent: &dyn Agent, input: &AnalysisInput) -> Result<AgentOutput, AgentError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| AgentError::invocation(format!("concurrency limiter closed: {}", e)))?;

        let call = AssertUnwindSafe(agent.analyze(input)).catch_unwind();
        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(AgentError::Timeout(self.timeout)),
            Ok(Err(panic)) => Err(AgentError::Panicked(panic_message(panic.as_ref()))),
            Ok(Ok(result)) => result,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_factory::AgentCreationError;
    use async_trait::async_trait;
    use ensemble_domain::{
        AgentConfig, AgentRole, ConfigIssueCode, FileRecord, FindingSeverity, Insight,
    };
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ==================== Mocks ====================

    #[derive(Clone)]
    enum Behavior {
        Succeed(AgentOutput),
        Fail(&'static str),
        Sleep(Duration, AgentOutput),
        Panic,
    }

    /// Tracks how many calls are in flight across agents
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    struct ScriptedAgent {
        name: String,
        behavior: Behavior,
        inputs: Mutex<Vec<AnalysisInput>>,
        gauge: Arc<Gauge>,
        /// Shared across agents to observe invocation order
        call_log: Option<Arc<Mutex<Vec<String>>>>,
    }

    impl ScriptedAgent {
        fn new(name: &str, behavior: Behavior) -> Arc<Self> {
            Self::with_gauge(name, behavior, Arc::new(Gauge::default()))
        }

        fn with_gauge(name: &str, behavior: Behavior, gauge: Arc<Gauge>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                behavior,
                inputs: Mutex::new(Vec::new()),
                gauge,
                call_log: None,
            })
        }

        fn logged(name: &str, behavior: Behavior, call_log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                behavior,
                inputs: Mutex::new(Vec::new()),
                gauge: Arc::new(Gauge::default()),
                call_log: Some(Arc::clone(call_log)),
            })
        }

        fn calls(&self) -> usize {
            self.inputs.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        fn name(&self) -> &str {
            &self.name
        }

        async fn analyze(&self, input: &AnalysisInput) -> Result<AgentOutput, AgentError> {
            self.inputs.lock().unwrap().push(input.clone());
            if let Some(log) = &self.call_log {
                log.lock().unwrap().push(format!("{}@{}", self.name, input.slot));
            }
            let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);

            let result = match &self.behavior {
                Behavior::Succeed(output) => Ok(output.clone()),
                Behavior::Fail(message) => Err(AgentError::invocation(*message)),
                Behavior::Sleep(duration, output) => {
                    tokio::time::sleep(*duration).await;
                    Ok(output.clone())
                }
                Behavior::Panic => panic!("agent exploded"),
            };

            self.gauge.current.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    /// Hands out one scripted agent per provider, whatever the role
    #[derive(Default)]
    struct MockFactory {
        agents: HashMap<Provider, Arc<ScriptedAgent>>,
    }

    impl MockFactory {
        fn with(mut self, provider: Provider, agent: Arc<ScriptedAgent>) -> Self {
            self.agents.insert(provider, agent);
            self
        }
    }

    #[async_trait]
    impl AgentFactory for MockFactory {
        async fn create_agent(
            &self,
            _role: AgentRole,
            provider: &Provider,
            _config: &AgentConfig,
        ) -> Result<Arc<dyn Agent>, AgentCreationError> {
            self.agents
                .get(provider)
                .map(|a| Arc::clone(a) as Arc<dyn Agent>)
                .ok_or_else(|| AgentCreationError::UnsupportedProvider(provider.clone()))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<RunPhase>>,
        fallbacks: Mutex<Vec<String>>,
        completed: Mutex<Vec<String>>,
    }

    impl ExecutionProgress for RecordingProgress {
        fn on_phase(&self, _analysis_id: &str, phase: RunPhase) {
            self.phases.lock().unwrap().push(phase);
        }

        fn on_slot_complete(&self, _analysis_id: &str, result: &SlotResult) {
            self.completed.lock().unwrap().push(result.slot.clone());
        }

        fn on_fallback(&self, _analysis_id: &str, _slot: &str, fallback_agent: &str) {
            self.fallbacks.lock().unwrap().push(fallback_agent.to_string());
        }
    }

    fn insight(message: &str) -> AgentOutput {
        AgentOutput::default().with_insight(Insight::new("quality", FindingSeverity::Medium, message))
    }

    fn payload() -> RepositoryPayload {
        RepositoryPayload::new("acme", "shop")
            .with_file(FileRecord::new("src/auth/login.rs", "fn login() {}"))
            .with_file(FileRecord::new("src/cart.rs", "struct Cart;"))
    }

    fn single_primary(strategy: AnalysisStrategy) -> MultiAgentConfig {
        MultiAgentConfig::new("review", strategy)
            .with_agent(AgentConfig::primary(Provider::Claude, AgentRole::CodeQuality))
    }

    fn executor(config: MultiAgentConfig, factory: MockFactory) -> MultiAgentExecutor {
        MultiAgentExecutor::new(config, Arc::new(factory), payload()).unwrap()
    }

    // ==================== Construction ====================

    #[test]
    fn invalid_config_is_rejected_before_execution() {
        let config = MultiAgentConfig::new("review", AnalysisStrategy::Parallel).with_agent(
            AgentConfig::primary(Provider::Claude, AgentRole::CodeQuality).with_temperature(1.5),
        );
        let error = MultiAgentExecutor::new(config, Arc::new(MockFactory::default()), payload())
            .err()
            .unwrap();
        assert_eq!(error.issues()[0].code, ConfigIssueCode::TemperatureOutOfRange);
    }

    // ==================== Fallback ====================

    #[tokio::test]
    async fn fallback_substitutes_for_failed_primary() {
        let config = single_primary(AnalysisStrategy::Parallel).with_fallback_agents(vec![
            AgentConfig::fallback(Provider::OpenAi, AgentRole::CodeQuality, 1),
        ]);
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Fail("Agent failure")))
            .with(
                Provider::OpenAi,
                ScriptedAgent::new("openai", Behavior::Succeed(insight("Fallback insight"))),
            );

        let report = executor(config, factory).execute().await;

        assert!(report.successful);
        assert!(report.used_fallback);
        let primary = report.result("primary").unwrap();
        assert!(primary.success);
        assert!(primary.used_fallback);
        assert_eq!(primary.provider, Some(Provider::OpenAi));
        assert_eq!(primary.insights()[0].message, "Fallback insight");
        assert_eq!(primary.attempts.len(), 2);
        assert_eq!(primary.attempts[0].error.as_deref(), Some("Agent failure"));
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn fallback_candidates_are_tried_by_priority() {
        let config = single_primary(AnalysisStrategy::Parallel).with_fallback_agents(vec![
            AgentConfig::fallback(Provider::Gemini, AgentRole::CodeQuality, 1),
            AgentConfig::fallback(Provider::OpenAi, AgentRole::CodeQuality, 5),
            AgentConfig::fallback(Provider::DeepSeek, AgentRole::CodeQuality, 3),
        ]);
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Fail("down")))
            .with(Provider::OpenAi, ScriptedAgent::new("openai", Behavior::Fail("down")))
            .with(Provider::DeepSeek, ScriptedAgent::new("deepseek", Behavior::Succeed(insight("ok"))))
            .with(Provider::Gemini, ScriptedAgent::new("gemini", Behavior::Succeed(insight("late"))));
        let progress = Arc::new(RecordingProgress::default());

        let report = executor(config, factory)
            .with_progress(progress.clone())
            .execute()
            .await;

        let primary = report.result("primary").unwrap();
        let agents: Vec<_> = primary.attempts.iter().map(|a| a.agent.as_str()).collect();
        assert_eq!(
            agents,
            vec!["primary", "fallback-for-primary-openai", "fallback-for-primary-deepseek"]
        );
        assert_eq!(primary.provider, Some(Provider::DeepSeek));
        assert_eq!(
            *progress.fallbacks.lock().unwrap(),
            vec!["fallback-for-primary-openai", "fallback-for-primary-deepseek"]
        );
    }

    #[tokio::test]
    async fn duplicate_fallback_provider_is_invoked_once() {
        let config = single_primary(AnalysisStrategy::Parallel).with_fallback_agents(vec![
            AgentConfig::fallback(Provider::OpenAi, AgentRole::CodeQuality, 2),
            AgentConfig::fallback(Provider::OpenAi, AgentRole::CodeQuality, 1),
        ]);
        let fallback = ScriptedAgent::new("openai", Behavior::Fail("down"));
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Fail("down")))
            .with(Provider::OpenAi, fallback.clone());

        let report = executor(config, factory).execute().await;

        let primary = report.result("primary").unwrap();
        let agents: Vec<_> = primary.attempts.iter().map(|a| a.agent.as_str()).collect();
        assert_eq!(agents, vec!["primary", "fallback-for-primary-openai"]);
        assert_eq!(fallback.calls(), 1);
        assert!(!primary.success);
    }

    #[tokio::test]
    async fn disabled_fallback_is_never_invoked() {
        let mut config = single_primary(AnalysisStrategy::Parallel).with_fallback_agents(vec![
            AgentConfig::fallback(Provider::OpenAi, AgentRole::CodeQuality, 1),
        ]);
        config.fallback_enabled = false;
        let fallback = ScriptedAgent::new("openai", Behavior::Succeed(insight("unused")));
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Fail("Agent failure")))
            .with(Provider::OpenAi, fallback.clone());

        let report = executor(config, factory).execute().await;

        assert!(!report.successful);
        assert!(!report.used_fallback);
        assert_eq!(fallback.calls(), 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::AgentInvocation);
    }

    #[tokio::test]
    async fn timeout_triggers_fallback() {
        let config = single_primary(AnalysisStrategy::Parallel)
            .with_fallback_agents(vec![AgentConfig::fallback(
                Provider::OpenAi,
                AgentRole::CodeQuality,
                1,
            )])
            .with_fallback_timeout(Duration::from_millis(50));
        let factory = MockFactory::default()
            .with(
                Provider::Claude,
                ScriptedAgent::new("claude", Behavior::Sleep(Duration::from_secs(10), insight("late"))),
            )
            .with(Provider::OpenAi, ScriptedAgent::new("openai", Behavior::Succeed(insight("fast"))));

        let started = Instant::now();
        let report = executor(config, factory).execute().await;

        assert!(started.elapsed() < Duration::from_secs(5));
        let primary = report.result("primary").unwrap();
        assert!(primary.used_fallback);
        assert_eq!(primary.attempts[0].error_kind, Some(ErrorKind::Timeout));
        assert_eq!(primary.insights()[0].message, "fast");
    }

    #[tokio::test]
    async fn creation_failure_is_reported_and_covered_by_fallback() {
        let config = single_primary(AnalysisStrategy::Parallel).with_fallback_agents(vec![
            AgentConfig::fallback(Provider::OpenAi, AgentRole::CodeQuality, 1),
        ]);
        let factory = MockFactory::default()
            .with(Provider::OpenAi, ScriptedAgent::new("openai", Behavior::Succeed(insight("ok"))));

        let report = executor(config, factory).execute().await;

        assert!(report.successful);
        assert!(report.result("primary").unwrap().used_fallback);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::AgentCreation);
        assert_eq!(report.errors[0].slot, "primary");
    }

    // ==================== Strategies ====================

    #[tokio::test]
    async fn unknown_strategy_executes_as_parallel() {
        let config = single_primary(AnalysisStrategy::from("round_robin"))
            .with_agent(AgentConfig::secondary(Provider::Gemini, AgentRole::Security));
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Succeed(insight("a"))))
            .with(Provider::Gemini, ScriptedAgent::new("gemini", Behavior::Succeed(insight("b"))));

        let report = executor(config, factory).execute().await;

        assert_eq!(report.strategy, AnalysisStrategy::Parallel);
        assert!(report.successful);
        assert_eq!(report.results.len(), 2);
    }

    #[tokio::test]
    async fn sequential_hands_primary_result_to_later_slots() {
        let config = single_primary(AnalysisStrategy::Sequential)
            .with_agent(AgentConfig::secondary(Provider::Gemini, AgentRole::Security));
        let secondary = ScriptedAgent::new("gemini", Behavior::Succeed(insight("second")));
        let factory = MockFactory::default()
            .with(
                Provider::Claude,
                ScriptedAgent::new(
                    "claude",
                    Behavior::Succeed(insight("first").with_metadata("stage", "primary")),
                ),
            )
            .with(Provider::Gemini, secondary.clone());

        let report = executor(config, factory).execute().await;

        assert!(report.successful);
        let inputs = secondary.inputs.lock().unwrap();
        let handed = inputs[0].primary_result.as_ref().unwrap();
        assert_eq!(handed.metadata["stage"], "primary");
        assert_eq!(inputs[0].slot, "secondary-0");
    }

    #[tokio::test]
    async fn sequential_continues_without_failed_primary() {
        let config = single_primary(AnalysisStrategy::Sequential)
            .with_agent(AgentConfig::secondary(Provider::Gemini, AgentRole::Security));
        let secondary = ScriptedAgent::new("gemini", Behavior::Succeed(insight("second")));
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Fail("Agent failure")))
            .with(Provider::Gemini, secondary.clone());

        let report = executor(config, factory).execute().await;

        assert!(report.successful);
        assert!(secondary.inputs.lock().unwrap()[0].primary_result.is_none());
    }

    #[tokio::test]
    async fn sequential_failed_secondary_does_not_block_later_slots() {
        let config = single_primary(AnalysisStrategy::Sequential)
            .with_agent(AgentConfig::secondary(Provider::Gemini, AgentRole::Security))
            .with_agent(AgentConfig::secondary(Provider::DeepSeek, AgentRole::Performance));
        let call_log = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory::default()
            .with(
                Provider::Claude,
                ScriptedAgent::logged("claude", Behavior::Succeed(insight("first")), &call_log),
            )
            .with(
                Provider::Gemini,
                ScriptedAgent::logged("gemini", Behavior::Fail("Agent failure"), &call_log),
            )
            .with(
                Provider::DeepSeek,
                ScriptedAgent::logged("deepseek", Behavior::Succeed(insight("third")), &call_log),
            );

        let report = executor(config, factory).execute().await;

        assert_eq!(
            *call_log.lock().unwrap(),
            vec!["claude@primary", "gemini@secondary-0", "deepseek@secondary-1"]
        );
        assert!(!report.result("secondary-0").unwrap().success);
        let last = report.result("secondary-1").unwrap();
        assert!(last.success);
        assert_eq!(last.insights()[0].message, "third");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].slot, "secondary-0");
    }

    #[tokio::test]
    async fn specialized_scopes_specialist_payloads() {
        let config = single_primary(AnalysisStrategy::Specialized).with_agent(
            AgentConfig::specialist(Provider::Gemini, AgentRole::Security, ["src/auth/**"]),
        );
        let primary = ScriptedAgent::new("claude", Behavior::Succeed(insight("a")));
        let specialist = ScriptedAgent::new("gemini", Behavior::Succeed(insight("b")));
        let factory = MockFactory::default()
            .with(Provider::Claude, primary.clone())
            .with(Provider::Gemini, specialist.clone());

        let report = executor(config, factory).execute().await;

        assert!(report.result("specialist-0").unwrap().success);
        let scoped = &specialist.inputs.lock().unwrap()[0].payload;
        let paths: Vec<_> = scoped.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/auth/login.rs"]);
        assert_eq!(primary.inputs.lock().unwrap()[0].payload.files.len(), 2);
    }

    // ==================== Failure handling ====================

    #[tokio::test]
    async fn total_failure_still_produces_a_report() {
        let config = single_primary(AnalysisStrategy::Parallel)
            .with_agent(AgentConfig::secondary(Provider::Gemini, AgentRole::Security))
            .with_fallback_agents(vec![AgentConfig::fallback(
                Provider::OpenAi,
                AgentRole::CodeQuality,
                1,
            )]);
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Fail("down")))
            .with(Provider::Gemini, ScriptedAgent::new("gemini", Behavior::Fail("down")))
            .with(Provider::OpenAi, ScriptedAgent::new("openai", Behavior::Fail("down")));

        let report = executor(config, factory).execute().await;

        assert!(!report.successful);
        assert!(!report.used_fallback);
        assert_eq!(report.errors.len(), 2);
        assert!(report.results.values().all(|r| r.error.is_some()));
        assert!(report.combined.as_ref().is_some_and(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn panicking_agent_is_recorded_as_failure() {
        let config = single_primary(AnalysisStrategy::Parallel)
            .with_agent(AgentConfig::secondary(Provider::Gemini, AgentRole::Security));
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Panic))
            .with(Provider::Gemini, ScriptedAgent::new("gemini", Behavior::Succeed(insight("ok"))));

        let report = executor(config, factory).execute().await;

        assert!(report.successful);
        let primary = report.result("primary").unwrap();
        assert!(!primary.success);
        assert!(primary.error.as_deref().unwrap().contains("agent exploded"));
        assert_eq!(report.errors[0].kind, ErrorKind::AgentInvocation);
    }

    // ==================== Concurrency ====================

    #[tokio::test]
    async fn concurrency_bound_is_respected() {
        let gauge = Arc::new(Gauge::default());
        let agent = ScriptedAgent::with_gauge(
            "claude",
            Behavior::Sleep(Duration::from_millis(30), insight("ok")),
            gauge.clone(),
        );
        let config = single_primary(AnalysisStrategy::Parallel)
            .with_agents((0..4).map(|_| AgentConfig::secondary(Provider::Claude, AgentRole::Security)))
            .with_max_concurrent_agents(2);
        let factory = MockFactory::default().with(Provider::Claude, agent.clone());

        let report = executor(config, factory).execute().await;

        assert_eq!(report.successful_slots().count(), 5);
        assert_eq!(agent.calls(), 5);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn zero_bound_runs_one_at_a_time() {
        let gauge = Arc::new(Gauge::default());
        let agent = ScriptedAgent::with_gauge(
            "claude",
            Behavior::Sleep(Duration::from_millis(10), insight("ok")),
            gauge.clone(),
        );
        let config = single_primary(AnalysisStrategy::Parallel)
            .with_agent(AgentConfig::secondary(Provider::Claude, AgentRole::Security))
            .with_max_concurrent_agents(0);
        let factory = MockFactory::default().with(Provider::Claude, agent);

        let report = executor(config, factory).execute().await;

        assert!(report.successful);
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    }

    // ==================== Progress ====================

    #[tokio::test]
    async fn phases_and_slots_are_reported() {
        let progress = Arc::new(RecordingProgress::default());
        let factory = MockFactory::default()
            .with(Provider::Claude, ScriptedAgent::new("claude", Behavior::Succeed(insight("ok"))));

        let report = executor(single_primary(AnalysisStrategy::Parallel), factory)
            .with_progress(progress.clone())
            .execute()
            .await;

        assert!(!report.analysis_id.is_empty());
        assert_eq!(
            *progress.phases.lock().unwrap(),
            vec![RunPhase::Init, RunPhase::Running, RunPhase::Aggregating, RunPhase::Done]
        );
        assert_eq!(*progress.completed.lock().unwrap(), vec!["primary"]);
    }
}

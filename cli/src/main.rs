//! CLI entrypoint for agent-ensemble
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod cli;
mod progress;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use cli::{Cli, Command};
use ensemble_application::{
    CachedSelector, CompositeProgress, ConfigOptions, ExecutionProgress, MultiAgentExecutor,
    MultiAgentFactory, validate_agent_availability,
};
use ensemble_domain::{
    AgentRole, AnalysisStrategy, MultiAgentConfig, RepositoryContext, validate_config,
};
use ensemble_infrastructure::{
    AgentRegistry, ConfigLoader, FileConfig, FilePlan, JsonlExecutionLogger, PreferenceSelector,
    load_payload,
};
use progress::LogProgress;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// How long `suggest` trusts a selector answer
const SELECTION_TTL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting agent-ensemble");

    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Command::Validate {
            plan,
            check_availability,
        } => validate(&config, &plan, check_availability).await,
        Command::Run {
            plan,
            payload,
            output,
            events,
        } => run(&config, &plan, &payload, output.as_deref(), events.as_deref()).await,
        Command::Suggest {
            role,
            secondary,
            language,
            strategy,
            no_fallback,
        } => {
            let mut options = ConfigOptions::default()
                .with_strategy(AnalysisStrategy::from(strategy.as_str()))
                .with_secondary_roles(parse_roles(&secondary)?)
                .with_fallback_timeout(Duration::from_millis(config.engine.fallback_timeout_ms))
                .with_max_concurrent_agents(config.engine.max_concurrent_agents);
            if no_fallback {
                options = options.without_fallback();
            }
            suggest(&config, parse_role(&role)?, &language, &options).await
        }
        Command::Config => {
            println!("Configuration sources (in priority order):");
            for source in ConfigLoader::config_sources(cli.config.as_deref()) {
                println!("  {}", source);
            }
            println!();
            println!("fallback_timeout_ms   = {}", config.engine.fallback_timeout_ms);
            println!("max_concurrent_agents = {}", config.engine.max_concurrent_agents);
            for (name, provider) in &config.providers {
                println!("provider {:<12} {} {}", name, provider.command, provider.args.join(" "));
            }
            Ok(())
        }
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn load_plan(config: &FileConfig, path: &Path) -> Result<MultiAgentConfig> {
    Ok(FilePlan::from_path(path)?.into_config(&config.engine))
}

fn parse_role(role: &str) -> Result<AgentRole> {
    role.parse().map_err(|e: String| anyhow!(e))
}

fn parse_roles(roles: &[String]) -> Result<Vec<AgentRole>> {
    roles.iter().map(|r| parse_role(r)).collect()
}

async fn validate(config: &FileConfig, plan_path: &Path, check_availability: bool) -> Result<()> {
    let plan = load_plan(config, plan_path)?;
    let report = validate_config(&plan);

    for issue in report.errors.iter().chain(&report.warnings) {
        println!("{:?}: {}", issue.severity, issue.message);
    }

    let mut valid = report.valid;
    if valid && check_availability {
        let registry = AgentRegistry::from_config(config);
        let availability = validate_agent_availability(&plan, &registry).await;
        for issue in &availability.errors {
            println!("{:?}: {}", issue.severity, issue.message);
        }
        valid = availability.valid;
    }

    if !valid {
        bail!("plan '{}' is not valid", plan.name);
    }
    println!("Plan '{}' is valid", plan.name);
    Ok(())
}

async fn run(
    config: &FileConfig,
    plan_path: &Path,
    payload_path: &Path,
    output: Option<&Path>,
    events: Option<&Path>,
) -> Result<()> {
    let plan = load_plan(config, plan_path)?;
    let payload = load_payload(payload_path)?;

    // === Dependency Injection ===
    let registry = Arc::new(AgentRegistry::from_config(config));
    let mut notifiers: Vec<Arc<dyn ExecutionProgress>> = vec![Arc::new(LogProgress)];
    if let Some(path) = events {
        let logger = JsonlExecutionLogger::new(path)
            .ok_or_else(|| anyhow!("could not open event log {}", path.display()))?;
        notifiers.push(Arc::new(logger));
    }

    let executor = MultiAgentExecutor::new(plan, registry, payload)?
        .with_progress(Arc::new(CompositeProgress::new(notifiers)));
    let report = executor.execute().await;

    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => std::fs::write(path, &json)
            .with_context(|| format!("could not write report to {}", path.display()))?,
        None => println!("{}", json),
    }

    if !report.successful {
        bail!("every slot of '{}' failed", report.config_name);
    }
    Ok(())
}

async fn suggest(
    config: &FileConfig,
    role: AgentRole,
    languages: &[String],
    options: &ConfigOptions,
) -> Result<()> {
    let selector = CachedSelector::new(PreferenceSelector::from_config(&config.selection), SELECTION_TTL);
    let factory = MultiAgentFactory::new(Arc::new(AgentRegistry::from_config(config)))
        .with_selector(Arc::new(selector));

    let plan = factory
        .create_adaptive_config(role, &RepositoryContext::new(languages.iter().cloned()), options)
        .await?;
    print!("{}", FilePlan::from_config(&plan).to_toml()?);
    Ok(())
}

//! Process-backed agent
//!
//! Runs the configured command once per analysis. The [`AnalysisInput`] is
//! written to the child's stdin as JSON and an [`AgentOutput`] JSON document
//! is expected on stdout. Tuning is passed through `ENSEMBLE_*` environment
//! variables.

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use ensemble_application::{Agent, AgentError};
use ensemble_domain::{AgentConfig, AgentOutput, AgentRole, AnalysisInput, Provider};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Maximum stderr excerpt carried into error messages
const MAX_STDERR_EXCERPT: usize = 512;

pub struct CommandAgent {
    name: String,
    command: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    role: AgentRole,
    provider: Provider,
    temperature: f64,
    max_tokens: u32,
    parameters: serde_json::Map<String, serde_json::Value>,
}

impl CommandAgent {
    pub fn new(
        settings: &FileProviderConfig,
        role: AgentRole,
        provider: Provider,
        config: &AgentConfig,
    ) -> Self {
        Self {
            name: format!("{}/{}", provider, role),
            command: settings.command.clone(),
            args: settings.args.clone(),
            working_dir: settings.working_dir.clone(),
            role,
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            parameters: config.parameters.clone(),
        }
    }

    fn build_command(&self, slot: &str) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .env("ENSEMBLE_ROLE", self.role.as_str())
            .env("ENSEMBLE_PROVIDER", self.provider.as_str())
            .env("ENSEMBLE_SLOT", slot)
            .env("ENSEMBLE_TEMPERATURE", self.temperature.to_string())
            .env("ENSEMBLE_MAX_TOKENS", self.max_tokens.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out attempt drops this future; the child must not outlive it.
            .kill_on_drop(true);

        if !self.parameters.is_empty() {
            cmd.env(
                "ENSEMBLE_PARAMETERS",
                serde_json::Value::Object(self.parameters.clone()).to_string(),
            );
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl Agent for CommandAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<AgentOutput, AgentError> {
        let body = serde_json::to_vec(input)
            .map_err(|e| AgentError::invocation(format!("Failed to encode input: {}", e)))?;

        debug!("Running {} for slot {}", self.command, input.slot);
        let mut child = self.build_command(&input.slot).spawn().map_err(|e| {
            AgentError::invocation(format!("Failed to spawn {}: {}", self.command, e))
        })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&body).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| {
            AgentError::invocation(format!("Failed to wait for {}: {}", self.command, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(MAX_STDERR_EXCERPT).collect();
            return Err(AgentError::invocation(format!(
                "{} exited with {}: {}",
                self.command, output.status, excerpt
            )));
        }
        if let Err(e) = fed {
            debug!("{} did not read its whole input: {}", self.command, e);
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AgentError::MalformedOutput(format!("{}: {}", self.command, e)))
    }
}

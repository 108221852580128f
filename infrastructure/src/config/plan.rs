//! Plan and payload files
//!
//! A plan file describes one [`MultiAgentConfig`] in TOML:
//!
//! ```toml
//! [plan]
//! name = "security-review"
//! strategy = "parallel"
//!
//! [[plan.agents]]
//! provider = "claude"
//! role = "security"
//! position = "primary"
//!
//! [[plan.fallback_agents]]
//! provider = "openai"
//! role = "security"
//! position = "fallback"
//! priority = 1
//! ```
//!
//! Payload files are JSON [`RepositoryPayload`] documents.

use super::file_config::FileEngineConfig;
use super::loader::ConfigLoadError;
use ensemble_domain::{AgentConfig, AnalysisStrategy, MultiAgentConfig, RepositoryPayload};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw `[plan]` table; engine settings are optional and default from `[engine]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlanSection {
    pub name: String,
    pub description: Option<String>,
    pub strategy: Option<AnalysisStrategy>,
    /// Defaults to true when `fallback_agents` is non-empty
    pub fallback_enabled: Option<bool>,
    pub fallback_timeout_ms: Option<u64>,
    pub max_concurrent_agents: Option<usize>,
    pub combine_results: Option<bool>,
    pub agents: Vec<AgentConfig>,
    pub fallback_agents: Vec<AgentConfig>,
}

/// A plan file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePlan {
    pub plan: FilePlanSection,
}

impl FilePlan {
    pub fn from_path(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = read(path)?;
        toml::from_str(&content).map_err(|source| ConfigLoadError::Plan {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Plan file describing `config` with every setting spelled out.
    pub fn from_config(config: &MultiAgentConfig) -> Self {
        Self {
            plan: FilePlanSection {
                name: config.name.clone(),
                description: config.description.clone(),
                strategy: config.strategy.clone(),
                fallback_enabled: Some(config.fallback_enabled),
                fallback_timeout_ms: Some(config.fallback_timeout_ms),
                max_concurrent_agents: Some(config.max_concurrent_agents),
                combine_results: Some(config.combine_results),
                agents: config.agents.clone(),
                fallback_agents: config.fallback_agents.clone(),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build the plan, filling unset engine settings from `engine`.
    ///
    /// The result is not validated yet.
    pub fn into_config(self, engine: &FileEngineConfig) -> MultiAgentConfig {
        let plan = self.plan;
        let fallback_enabled = plan
            .fallback_enabled
            .unwrap_or(!plan.fallback_agents.is_empty());

        MultiAgentConfig {
            name: plan.name,
            description: plan.description,
            strategy: plan.strategy,
            agents: plan.agents,
            fallback_enabled,
            fallback_agents: plan.fallback_agents,
            fallback_timeout_ms: plan
                .fallback_timeout_ms
                .unwrap_or(engine.fallback_timeout_ms),
            max_concurrent_agents: plan
                .max_concurrent_agents
                .unwrap_or(engine.max_concurrent_agents),
            combine_results: plan.combine_results.unwrap_or(true),
        }
    }
}

/// Read a JSON repository payload.
pub fn load_payload(path: &Path) -> Result<RepositoryPayload, ConfigLoadError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| ConfigLoadError::Payload {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<String, ConfigLoadError> {
    std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{AgentPosition, AgentRole, Provider, validate_config};
    use std::io::Write;

    const PLAN: &str = r#"
[plan]
name = "security-review"
strategy = "specialized"
max_concurrent_agents = 2

[[plan.agents]]
provider = "claude"
role = "security"
position = "primary"
temperature = 0.2

[[plan.agents]]
provider = "gemini"
role = "security"
position = "specialist"
focus_areas = ["src/auth/**"]

[[plan.fallback_agents]]
provider = "openai"
role = "security"
position = "fallback"
priority = 1
"#;

    fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_plan_file_converts_to_valid_config() {
        let file = write_temp(PLAN, ".toml");
        let plan = FilePlan::from_path(file.path()).unwrap();
        let engine = FileEngineConfig {
            fallback_timeout_ms: 1234,
            max_concurrent_agents: 9,
        };

        let config = plan.into_config(&engine);

        assert_eq!(config.name, "security-review");
        assert_eq!(config.strategy, Some(AnalysisStrategy::Specialized));
        assert_eq!(config.agents[1].position, Some(AgentPosition::Specialist));
        assert_eq!(config.fallback_agents[0].provider, Some(Provider::OpenAi));
        assert!(config.fallback_enabled);
        assert_eq!(config.fallback_timeout_ms, 1234);
        assert_eq!(config.max_concurrent_agents, 2);
        assert!(validate_config(&config).valid);
    }

    #[test]
    fn test_plan_without_fallbacks_disables_fallback() {
        let plan: FilePlan = toml::from_str(
            r#"
[plan]
name = "quick"
strategy = "parallel"

[[plan.agents]]
provider = "claude"
role = "code_quality"
position = "primary"
"#,
        )
        .unwrap();
        let config = plan.into_config(&FileEngineConfig::default());
        assert!(!config.fallback_enabled);
        assert_eq!(config.agents[0].role, Some(AgentRole::CodeQuality));
    }

    #[test]
    fn test_generated_plan_reads_back() {
        let file = write_temp(PLAN, ".toml");
        let config = FilePlan::from_path(file.path())
            .unwrap()
            .into_config(&FileEngineConfig::default());

        let rendered = FilePlan::from_config(&config).to_toml().unwrap();
        let reparsed: FilePlan = toml::from_str(&rendered).unwrap();

        assert_eq!(reparsed.into_config(&FileEngineConfig::default()), config);
    }

    #[test]
    fn test_missing_plan_file_is_io_error() {
        let error = FilePlan::from_path(Path::new("/nonexistent/plan.toml")).unwrap_err();
        assert!(matches!(error, ConfigLoadError::Io { .. }));
    }

    #[test]
    fn test_malformed_plan_is_parse_error() {
        let file = write_temp("[plan\nname =", ".toml");
        let error = FilePlan::from_path(file.path()).unwrap_err();
        assert!(matches!(error, ConfigLoadError::Plan { .. }));
    }

    #[test]
    fn test_load_payload() {
        let file = write_temp(
            r#"{"owner":"acme","repo":"shop","pr_number":7,"files":[{"path":"src/main.rs","content":"fn main() {}"}]}"#,
            ".json",
        );
        let payload = load_payload(file.path()).unwrap();
        assert_eq!(payload.display_name(), "acme/shop#7");
        assert_eq!(payload.files[0].path, "src/main.rs");
    }
}

//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use ensemble_domain::{
    AgentRole, DEFAULT_FALLBACK_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_AGENTS, Provider,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("engine.fallback_timeout_ms cannot be 0")]
    InvalidTimeout,

    #[error("providers.{0}.command cannot be empty")]
    EmptyCommand(String),

    #[error("selection.roles: unknown role '{0}'")]
    UnknownRole(String),
}

/// Engine defaults applied to plans that leave them out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Time budget for a single agent attempt
    pub fallback_timeout_ms: u64,
    /// Bound on in-flight agent invocations
    pub max_concurrent_agents: usize,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            fallback_timeout_ms: DEFAULT_FALLBACK_TIMEOUT_MS,
            max_concurrent_agents: DEFAULT_MAX_CONCURRENT_AGENTS,
        }
    }
}

/// External command backing one provider (`[providers.<name>]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Executable to run per analysis
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Role-based provider preferences (`[selection]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSelectionConfig {
    /// Provider used for roles without an explicit entry
    pub default: Option<Provider>,
    /// Role name → provider
    pub roles: BTreeMap<String, Provider>,
}

impl FileSelectionConfig {
    /// Parsed `[selection.roles]` entries; unknown role names are skipped.
    pub fn parse_roles(&self) -> Vec<(AgentRole, Provider)> {
        self.roles
            .iter()
            .filter_map(|(role, provider)| Some((role.parse().ok()?, provider.clone())))
            .collect()
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    /// Provider name → command settings
    pub providers: BTreeMap<String, FileProviderConfig>,
    pub selection: FileSelectionConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.engine.fallback_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        for (name, provider) in &self.providers {
            if provider.command.trim().is_empty() {
                return Err(ConfigValidationError::EmptyCommand(name.clone()));
            }
        }

        for role in self.selection.roles.keys() {
            if role.parse::<AgentRole>().is_err() {
                return Err(ConfigValidationError::UnknownRole(role.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[engine]
fallback_timeout_ms = 5000
max_concurrent_agents = 8

[providers.claude]
command = "claude-review"
args = ["--json"]

[providers.openai]
command = "./bin/openai-agent"
working_dir = "/srv/agents"

[selection]
default = "openai"

[selection.roles]
security = "claude"
performance = "deepseek"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.fallback_timeout_ms, 5000);
        assert_eq!(config.engine.max_concurrent_agents, 8);
        assert_eq!(config.providers["claude"].args, vec!["--json"]);
        assert_eq!(
            config.providers["openai"].working_dir,
            Some(PathBuf::from("/srv/agents"))
        );
        assert_eq!(config.selection.default, Some(Provider::OpenAi));
        assert_eq!(
            config.selection.parse_roles(),
            vec![
                (AgentRole::Performance, Provider::DeepSeek),
                (AgentRole::Security, Provider::Claude),
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[engine]\nmax_concurrent_agents = 1\n").unwrap();
        assert_eq!(config.engine.max_concurrent_agents, 1);
        assert_eq!(config.engine.fallback_timeout_ms, DEFAULT_FALLBACK_TIMEOUT_MS);
        assert!(config.providers.is_empty());
        assert!(config.selection.default.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = FileConfig::default();
        config.engine.fallback_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = FileConfig::default();
        config
            .providers
            .insert("gemini".to_string(), FileProviderConfig::default());
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyCommand("gemini".to_string()))
        );
    }

    #[test]
    fn test_validate_unknown_role() {
        let mut config = FileConfig::default();
        config
            .selection
            .roles
            .insert("styling".to_string(), Provider::Claude);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownRole("styling".to_string()))
        );
    }
}

//! Analysis roles an agent can be asked to play

use serde::{Deserialize, Serialize};

/// The kind of analysis an agent performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    CodeQuality,
    Security,
    Performance,
    Dependency,
    Architecture,
    Educational,
    ReportGeneration,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::CodeQuality => "code_quality",
            AgentRole::Security => "security",
            AgentRole::Performance => "performance",
            AgentRole::Dependency => "dependency",
            AgentRole::Architecture => "architecture",
            AgentRole::Educational => "educational",
            AgentRole::ReportGeneration => "report_generation",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "code_quality" | "quality" => Ok(AgentRole::CodeQuality),
            "security" => Ok(AgentRole::Security),
            "performance" => Ok(AgentRole::Performance),
            "dependency" | "dependencies" => Ok(AgentRole::Dependency),
            "architecture" => Ok(AgentRole::Architecture),
            "educational" => Ok(AgentRole::Educational),
            "report_generation" | "report" => Ok(AgentRole::ReportGeneration),
            other => Err(format!(
                "Unknown agent role: {}. Valid: code_quality, security, performance, dependency, architecture, educational, report_generation",
                other
            )),
        }
    }
}

//! Execution strategy for a multi-agent plan
//!
//! The strategy governs slot scheduling order and input scope:
//!
//! - `Parallel`: every slot runs concurrently
//! - `Sequential`: the primary slot resolves first, then the others run in
//!   declared order with the primary's output in their input
//! - `Specialized`: parallel, but specialist slots only see the files that
//!   match their focus areas

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisStrategy {
    #[default]
    Parallel,
    Sequential,
    Specialized,
    /// Any other value found in a plan. Executes as [`AnalysisStrategy::Parallel`].
    Unknown(String),
}

impl AnalysisStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisStrategy::Parallel => "parallel",
            AnalysisStrategy::Sequential => "sequential",
            AnalysisStrategy::Specialized => "specialized",
            AnalysisStrategy::Unknown(s) => s,
        }
    }

    /// The strategy that will actually be executed.
    pub fn effective(&self) -> AnalysisStrategy {
        match self {
            AnalysisStrategy::Unknown(_) => AnalysisStrategy::Parallel,
            known => known.clone(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AnalysisStrategy::Unknown(_))
    }
}

impl std::fmt::Display for AnalysisStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for AnalysisStrategy {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "parallel" => AnalysisStrategy::Parallel,
            "sequential" => AnalysisStrategy::Sequential,
            "specialized" => AnalysisStrategy::Specialized,
            _ => AnalysisStrategy::Unknown(s.trim().to_string()),
        }
    }
}

impl Serialize for AnalysisStrategy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnalysisStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AnalysisStrategy::from(s.as_str()))
    }
}

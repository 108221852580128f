//! Orchestration domain entities

use serde::{Deserialize, Serialize};

/// Lifecycle phase of one execution run.
///
/// There is no failed phase: a run whose slots all fail still reaches
/// [`RunPhase::Done`] with an unsuccessful report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Init,
    Running,
    Aggregating,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &str {
        match self {
            RunPhase::Init => "init",
            RunPhase::Running => "running",
            RunPhase::Aggregating => "aggregating",
            RunPhase::Done => "done",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            RunPhase::Init => "Initializing",
            RunPhase::Running => "Running agents",
            RunPhase::Aggregating => "Aggregating results",
            RunPhase::Done => "Done",
        }
    }

    /// The phase that follows this one, if any.
    pub fn next(&self) -> Option<RunPhase> {
        match self {
            RunPhase::Init => Some(RunPhase::Running),
            RunPhase::Running => Some(RunPhase::Aggregating),
            RunPhase::Aggregating => Some(RunPhase::Done),
            RunPhase::Done => None,
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

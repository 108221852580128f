//! Repository payload shared by every agent in a run

use crate::agent::config::AgentConfig;
use crate::core::role::AgentRole;
use crate::analysis::findings::AgentOutput;
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

/// One file of the repository or pull request under analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }
}

/// Read-only input of an analysis run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryPayload {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

impl RepositoryPayload {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Default::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_pr_number(mut self, pr_number: u64) -> Self {
        self.pr_number = Some(pr_number);
        self
    }

    pub fn with_file(mut self, file: FileRecord) -> Self {
        self.files.push(file);
        self
    }

    /// `owner/repo`, plus `#pr` when analysing a pull request.
    pub fn display_name(&self) -> String {
        match self.pr_number {
            Some(pr) => format!("{}/{}#{}", self.owner, self.repo, pr),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }

    /// A copy restricted to files matching at least one focus pattern.
    ///
    /// Patterns are globs (`src/**/*.rs`, `*.sql`). A single `*` stays within
    /// one directory; only `**` crosses into subdirectories. A pattern without glob
    /// metacharacters also matches everything below it as a directory prefix
    /// (`src/auth` matches `src/auth/login.rs`). Invalid patterns match only
    /// by prefix. An empty pattern list keeps every file.
    pub fn scoped_to(&self, patterns: &[String]) -> RepositoryPayload {
        if patterns.is_empty() {
            return self.clone();
        }

        let matchers: Vec<FocusMatcher> = patterns.iter().map(|p| FocusMatcher::new(p)).collect();
        RepositoryPayload {
            files: self
                .files
                .iter()
                .filter(|f| matchers.iter().any(|m| m.matches(&f.path)))
                .cloned()
                .collect(),
            ..self.clone_header()
        }
    }

    fn clone_header(&self) -> RepositoryPayload {
        RepositoryPayload {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            pr_number: self.pr_number,
            files: Vec::new(),
        }
    }
}

struct FocusMatcher {
    prefix: String,
    pattern: Option<Pattern>,
}

impl FocusMatcher {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_start_matches("./");
        Self {
            prefix: trimmed.trim_end_matches('/').to_string(),
            pattern: Pattern::new(trimmed).ok(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let path = path.trim_start_matches("./");
        if let Some(pattern) = &self.pattern
            && pattern.matches_with(path, Self::OPTIONS)
        {
            return true;
        }
        !self.prefix.is_empty()
            && (path == self.prefix
                || path
                    .strip_prefix(&self.prefix)
                    .is_some_and(|rest| rest.starts_with('/')))
    }
}

/// What a single agent invocation receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// Slot the invocation runs for
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AgentRole>,
    pub payload: RepositoryPayload,
    /// Output of the primary slot, handed to later slots under the sequential strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_result: Option<AgentOutput>,
}

impl AnalysisInput {
    pub fn new(slot: impl Into<String>, agent: &AgentConfig, payload: RepositoryPayload) -> Self {
        Self {
            slot: slot.into(),
            role: agent.role,
            payload,
            primary_result: None,
        }
    }

    pub fn with_primary_result(mut self, primary_result: AgentOutput) -> Self {
        self.primary_result = Some(primary_result);
        self
    }
}

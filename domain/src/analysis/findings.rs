//! Findings produced by analysis agents

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// An observation about the analysed code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insight {
    /// Category such as `quality` or `vulnerability`
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: FindingSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Insight {
    pub fn new(
        kind: impl Into<String>,
        severity: FindingSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }
}

/// A concrete change proposal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub suggestion: String,
}

impl Suggestion {
    pub fn new(file: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            suggestion: suggestion.into(),
        }
    }
}

/// Background material explaining a finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EducationalNote {
    pub topic: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
}

impl EducationalNote {
    pub fn new(topic: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            explanation: explanation.into(),
            skill_level: None,
        }
    }
}

/// Successful result of one `analyze()` call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOutput {
    pub insights: Vec<Insight>,
    pub suggestions: Vec<Suggestion>,
    pub educational: Vec<EducationalNote>,
    pub metadata: Map<String, Value>,
}

impl AgentOutput {
    pub fn with_insight(mut self, insight: Insight) -> Self {
        self.insights.push(insight);
        self
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    pub fn with_educational(mut self, note: EducationalNote) -> Self {
        self.educational.push(note);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty() && self.suggestions.is_empty() && self.educational.is_empty()
    }

    /// Merge several outputs, dropping exact duplicates.
    ///
    /// Order follows first appearance. Metadata of each source is nested
    /// under its label so that keys from different agents cannot collide.
    pub fn combine<'a, I>(outputs: I) -> AgentOutput
    where
        I: IntoIterator<Item = (&'a str, &'a AgentOutput)>,
    {
        let mut combined = AgentOutput::default();
        let mut seen_insights = HashSet::new();
        let mut seen_suggestions = HashSet::new();
        let mut seen_notes = HashSet::new();

        for (label, output) in outputs {
            for insight in &output.insights {
                if seen_insights.insert(insight) {
                    combined.insights.push(insight.clone());
                }
            }
            for suggestion in &output.suggestions {
                if seen_suggestions.insert(suggestion) {
                    combined.suggestions.push(suggestion.clone());
                }
            }
            for note in &output.educational {
                if seen_notes.insert(note) {
                    combined.educational.push(note.clone());
                }
            }
            if !output.metadata.is_empty() {
                combined
                    .metadata
                    .insert(label.to_string(), Value::Object(output.metadata.clone()));
            }
        }

        combined
            .insights
            .sort_by(|a, b| b.severity.cmp(&a.severity));
        combined
    }
}

//! JSONL file writer for execution events.
//!
//! Each progress callback becomes one JSON line with a `type` field and a
//! `timestamp`, appended to the file via a buffered writer.

use ensemble_application::{AgentError, ExecutionProgress};
use ensemble_domain::{RunPhase, SlotResult};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// One structured record of an execution run
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionEvent {
    pub event_type: &'static str,
    pub analysis_id: String,
    pub payload: Value,
}

impl ExecutionEvent {
    pub fn new(event_type: &'static str, analysis_id: &str, payload: Value) -> Self {
        Self {
            event_type,
            analysis_id: analysis_id.to_string(),
            payload,
        }
    }
}

/// JSONL execution logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlExecutionLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlExecutionLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, event: ExecutionEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), Value::String(event.event_type.to_string()));
        record.insert("analysis_id".to_string(), Value::String(event.analysis_id));
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&Value::Object(record)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl ExecutionProgress for JsonlExecutionLogger {
    fn on_phase(&self, analysis_id: &str, phase: RunPhase) {
        self.log(ExecutionEvent::new(
            "phase",
            analysis_id,
            json!({ "phase": phase.as_str() }),
        ));
    }

    fn on_slot_complete(&self, analysis_id: &str, result: &SlotResult) {
        self.log(ExecutionEvent::new(
            "slot_complete",
            analysis_id,
            json!({
                "slot": result.slot,
                "provider": result.provider,
                "success": result.success,
                "used_fallback": result.used_fallback,
                "attempts": result.attempts.len(),
                "duration_ms": result.duration_ms,
                "insights": result.insights().len(),
                "error": result.error,
            }),
        ));
    }

    fn on_slot_start(&self, analysis_id: &str, slot: &str, agent: &str) {
        self.log(ExecutionEvent::new(
            "slot_start",
            analysis_id,
            json!({ "slot": slot, "agent": agent }),
        ));
    }

    fn on_attempt_failed(&self, analysis_id: &str, slot: &str, agent: &str, error: &AgentError) {
        self.log(ExecutionEvent::new(
            "attempt_failed",
            analysis_id,
            json!({
                "slot": slot,
                "agent": agent,
                "kind": error.kind(),
                "error": error.to_string(),
            }),
        ));
    }

    fn on_fallback(&self, analysis_id: &str, slot: &str, fallback_agent: &str) {
        self.log(ExecutionEvent::new(
            "fallback",
            analysis_id,
            json!({ "slot": slot, "agent": fallback_agent }),
        ));
    }
}

impl Drop for JsonlExecutionLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{AgentOutput, AttemptRecord, ErrorKind, Provider};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_logger_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.events.jsonl");
        let logger = JsonlExecutionLogger::new(&path).unwrap();

        logger.on_phase("run-1", RunPhase::Running);
        logger.on_attempt_failed(
            "run-1",
            "primary",
            "primary",
            &AgentError::invocation("Agent failure"),
        );
        logger.on_fallback("run-1", "primary", "fallback-for-primary-openai");
        logger.on_slot_complete(
            "run-1",
            &SlotResult::success(
                "primary",
                None,
                Some(Provider::OpenAi),
                AgentOutput::default(),
                true,
                vec![AttemptRecord::succeeded("fallback-for-primary-openai", Some(Provider::OpenAi), 3)],
            ),
        );
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line["analysis_id"], "run-1");
            assert!(line.get("timestamp").is_some());
        }
        assert_eq!(lines[0]["type"], "phase");
        assert_eq!(lines[0]["phase"], "running");
        assert_eq!(lines[1]["type"], "attempt_failed");
        assert_eq!(lines[1]["error"], "Agent failure");
        assert_eq!(lines[1]["kind"], serde_json::to_value(ErrorKind::AgentInvocation).unwrap());
        assert_eq!(lines[2]["agent"], "fallback-for-primary-openai");
        assert_eq!(lines[3]["type"], "slot_complete");
        assert_eq!(lines[3]["used_fallback"], true);
        assert_eq!(lines[3]["provider"], "openai");
    }

    #[test]
    fn test_jsonl_logger_handles_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.events.jsonl");
        let logger = JsonlExecutionLogger::new(&path).unwrap();

        logger.log(ExecutionEvent::new("note", "run-2", json!("just a string")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "just a string");
    }

    #[test]
    fn test_jsonl_logger_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");
        let logger = JsonlExecutionLogger::new(&path).unwrap();
        assert_eq!(logger.path(), path.as_path());
        assert!(path.exists());
    }
}

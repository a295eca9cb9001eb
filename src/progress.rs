use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const EVENT_LOG_FILE: &str = "progress.jsonl";

/// One line of `progress.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    pub domain: String,
    pub event_type: EventType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    RunStarted,
    StageStarted { tool: String },
    StageCompleted { tool: String, lines: usize },
    StageSkipped { tool: String, reason: String },
    StageFailed { tool: String, error: String },
    RunCompleted,
    RunFailed { error: String },
}

/// Append-only event log for a single domain run.
///
/// Writes are best-effort: a log that cannot be written never fails the
/// run it describes.
#[derive(Debug, Clone)]
pub struct EventLog {
    run_id: String,
    domain: String,
    file: PathBuf,
}

impl EventLog {
    pub fn new(domain: &str, domain_dir: &Path) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            domain: domain.to_string(),
            file: domain_dir.join(EVENT_LOG_FILE),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record(&self, event_type: EventType, message: impl Into<String>) {
        let event = RunEvent {
            timestamp: Utc::now(),
            run_id: self.run_id.clone(),
            domain: self.domain.clone(),
            event_type,
            message: message.into(),
        };

        if let Ok(json) = serde_json::to_string(&event) {
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file)
            {
                writeln!(file, "{}", json).ok();
            }
        }
    }

    pub fn run_started(&self) {
        self.record(EventType::RunStarted, format!("Starting enumeration of {}", self.domain));
    }

    pub fn stage_started(&self, tool: &str) {
        self.record(
            EventType::StageStarted { tool: tool.to_string() },
            format!("Running {}", tool),
        );
    }

    pub fn stage_completed(&self, tool: &str, lines: usize) {
        self.record(
            EventType::StageCompleted { tool: tool.to_string(), lines },
            format!("{} finished with {} line(s)", tool, lines),
        );
    }

    pub fn stage_skipped(&self, tool: &str, reason: &str) {
        self.record(
            EventType::StageSkipped {
                tool: tool.to_string(),
                reason: reason.to_string(),
            },
            format!("{} skipped: {}", tool, reason),
        );
    }

    pub fn stage_failed(&self, tool: &str, error: &str) {
        self.record(
            EventType::StageFailed {
                tool: tool.to_string(),
                error: error.to_string(),
            },
            format!("{} failed: {}", tool, error),
        );
    }

    pub fn run_completed(&self) {
        self.record(EventType::RunCompleted, format!("Enumeration of {} complete", self.domain));
    }

    pub fn run_failed(&self, error: &str) {
        self.record(
            EventType::RunFailed { error: error.to_string() },
            format!("Enumeration of {} failed: {}", self.domain, error),
        );
    }

    /// Reads back every parseable event. Malformed lines are skipped.
    pub fn read_events(file: &Path) -> Vec<RunEvent> {
        fs::read_to_string(file)
            .map(|content| {
                content
                    .lines()
                    .filter_map(|line| serde_json::from_str::<RunEvent>(line).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_events_append_in_order() {
        let dir = tempdir().unwrap();
        let log = EventLog::new("example.com", dir.path());
        log.run_started();
        log.stage_started("subfinder");
        log.stage_completed("subfinder", 4);
        log.run_completed();

        let events = EventLog::read_events(&dir.path().join(EVENT_LOG_FILE));
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.run_id == log.run_id()));
        assert_eq!(events[0].event_type, EventType::RunStarted);
        assert_eq!(
            events[2].event_type,
            EventType::StageCompleted { tool: "subfinder".into(), lines: 4 }
        );
    }

    #[test]
    fn test_unwritable_log_is_ignored() {
        let log = EventLog::new("example.com", Path::new("/nonexistent/dir/for/log"));
        log.run_started();
    }
}

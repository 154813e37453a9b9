//! JSONL file writer for collaboration events.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying the payload's
//! fields plus `type` and `timestamp`. Files are opened in append mode so a
//! REPL session and later single-shot runs can share one transcript.

use chrono::{SecondsFormat, Utc};
use cowrite_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// JSONL conversation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create conversation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open conversation log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        debug!(path = %path.display(), "Conversation log opened");
        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// A fresh log file in `dir`, named after the current UTC time.
    pub fn in_dir(dir: impl AsRef<Path>) -> Option<Self> {
        let name = format!(
            "cowrite-{}.conversation.jsonl",
            Utc::now().format("%Y%m%dT%H%M%S")
        );
        Self::new(dir.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Merge the payload with `type` and `timestamp`. Non-object payloads are
/// nested under `data`.
fn record(event: ConversationEvent, timestamp: String) -> Value {
    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert(
        "type".to_string(),
        Value::String(event.event_type.to_string()),
    );
    map.insert("timestamp".to_string(), Value::String(timestamp));
    Value::Object(map)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let Ok(line) = serde_json::to_string(&record(event, timestamp)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.conversation.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            "classification",
            json!({"action": "delegate", "turns": 2}),
        ));
        logger.log(ConversationEvent::new(
            "waypoint",
            json!({"agent": "agent-1", "turn": 1, "applied": 3}),
        ));
        drop(logger);

        let records = lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "classification");
        assert_eq!(records[0]["action"], "delegate");
        assert_eq!(records[1]["type"], "waypoint");
        assert_eq!(records[1]["applied"], 3);
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.jsonl");

        for turn in 1..=2 {
            let logger = JsonlConversationLogger::new(&path).unwrap();
            logger.log(ConversationEvent::new("agent_turn", json!({"turn": turn})));
        }

        let records = lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["turn"], 2);
    }

    #[test]
    fn test_non_object_payload_is_nested() {
        let value = record(
            ConversationEvent::new("reconciliation", json!("no unified change")),
            "2026-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(value["type"], "reconciliation");
        assert_eq!(value["data"], "no unified change");
        assert_eq!(value["timestamp"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_in_dir_names_file_by_time() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlConversationLogger::in_dir(dir.path()).unwrap();
        let name = logger.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cowrite-"));
        assert!(name.ends_with(".conversation.jsonl"));
    }
}

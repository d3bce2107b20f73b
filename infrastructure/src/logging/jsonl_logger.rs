//! JSONL file writer for model transcripts.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying its `type`, a
//! `timestamp` and the workflow `product`. The file is opened in append
//! mode so repeated workflows accumulate in one transcript.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use triangulation_application::{ConversationEvent, ConversationLogger};

/// JSONL conversation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    product: String,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path` for workflows on `product`.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>, product: impl Into<String>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            product: product.into(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, event: ConversationEvent) -> serde_json::Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut record = match event.payload {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), event.event_type.into());
        record.insert("timestamp".to_string(), timestamp.into());
        record.insert("product".to_string(), self.product.clone().into());
        serde_json::Value::Object(record)
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&self.record(event)) else {
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

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = JsonlConversationLogger::open(&path, "Diesel Generator").unwrap();

        logger.log(ConversationEvent::new(
            "llm_request",
            serde_json::json!({"stage": "run_1_triangulation", "bytes": 42}),
        ));
        logger.log(ConversationEvent::new(
            "llm_response",
            serde_json::json!({"stage": "run_1_triangulation", "text": "| a | b | c | d |"}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "llm_request");
        assert_eq!(lines[0]["bytes"], 42);
        assert_eq!(lines[0]["product"], "Diesel Generator");
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(lines[1]["text"], "| a | b | c | d |");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapped.jsonl");
        let logger = JsonlConversationLogger::open(&path, "Kettle").unwrap();

        logger.log(ConversationEvent::new("note", serde_json::json!("just a string")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "just a string");
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("append.jsonl");

        for product in ["first", "second"] {
            let logger = JsonlConversationLogger::open(&path, product).unwrap();
            logger.log(ConversationEvent::new("llm_request", serde_json::json!({})));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["product"], "second");
    }
}

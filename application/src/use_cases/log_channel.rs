//! Workflow log channel.
//!
//! Stages never write the workflow log directly. Each one holds a
//! [`LogSender`] and the orchestrator drains the shared [`LogChannel`] into
//! the state between stages, so the log only ever grows by append.

use tokio::sync::mpsc;

/// One line produced by a stage for the workflow log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub producer: &'static str,
    pub line: String,
}

/// Producer side of the workflow log. One per stage; cheap to clone.
#[derive(Debug, Clone)]
pub struct LogSender {
    producer: &'static str,
    tx: mpsc::UnboundedSender<LogEntry>,
}

impl LogSender {
    /// Append a line. Lines sent after the channel is gone are dropped.
    pub fn send(&self, line: impl Into<String>) {
        let _ = self.tx.send(LogEntry {
            producer: self.producer,
            line: line.into(),
        });
    }
}

/// Append-only log channel drained by the orchestrator.
///
/// Each producer's lines arrive in the order it sent them; lines from
/// different producers interleave in arrival order.
pub struct LogChannel {
    tx: mpsc::UnboundedSender<LogEntry>,
    rx: mpsc::UnboundedReceiver<LogEntry>,
}

impl LogChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self, producer: &'static str) -> LogSender {
        LogSender {
            producer,
            tx: self.tx.clone(),
        }
    }

    /// Take every line queued so far.
    pub fn drain(&mut self) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        while let Ok(entry) = self.rx.try_recv() {
            entries.push(entry);
        }
        entries
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_channel_preserves_producer_order() {
        let mut channel = LogChannel::new();
        let a = channel.sender("triangulation");
        let b = channel.sender("extraction");

        a.send("a1");
        b.send("b1");
        a.send("a2");

        let entries = channel.drain();
        let from_a: Vec<_> = entries
            .iter()
            .filter(|e| e.producer == "triangulation")
            .map(|e| e.line.as_str())
            .collect();
        assert_eq!(from_a, vec!["a1", "a2"]);
        assert_eq!(entries.len(), 3);
        assert!(channel.drain().is_empty());
    }
}

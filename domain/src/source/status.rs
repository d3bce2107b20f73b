//! Lifecycle status of one source within a run.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a source's extraction.
///
/// ```text
/// not_uploaded                      (terminal for the whole workflow)
/// idle ──▶ processing ──▶ completed
///                    └──▶ failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// The caller supplied no data for this source
    #[default]
    NotUploaded,
    /// Uploaded, waiting for extraction
    Idle,
    /// Extraction in flight
    Processing,
    /// Extraction finished with a parsed table
    Completed,
    /// Extraction failed; the run continues without this source
    Failed,
}

impl SourceStatus {
    /// All statuses, used for exhaustive tests over assignments.
    pub const ALL: [SourceStatus; 5] = [
        SourceStatus::NotUploaded,
        SourceStatus::Idle,
        SourceStatus::Processing,
        SourceStatus::Completed,
        SourceStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::NotUploaded => "not_uploaded",
            SourceStatus::Idle => "idle",
            SourceStatus::Processing => "processing",
            SourceStatus::Completed => "completed",
            SourceStatus::Failed => "failed",
        }
    }

    /// `completed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceStatus::Completed | SourceStatus::Failed)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SourceStatus::Completed)
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

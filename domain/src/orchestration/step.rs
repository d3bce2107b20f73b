//! Workflow step: coarse position of the orchestrator in the protocol.

use serde::{Deserialize, Serialize};

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "step", content = "run", rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Initialization,
    /// Per-source extraction of run N
    Extraction(u8),
    /// Triangulation of run N
    Triangulation(u8),
    MetaEnsemble,
    Completed,
    MetaEnsembleFailed,
    /// Too few runs succeeded to ensemble
    Failed,
    Cancelled,
}

impl WorkflowStep {
    /// Whether the workflow has stopped.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStep::Completed
                | WorkflowStep::MetaEnsembleFailed
                | WorkflowStep::Failed
                | WorkflowStep::Cancelled
        )
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStep::Initialization => write!(f, "initialization"),
            WorkflowStep::Extraction(run) => write!(f, "run_{}_extraction", run),
            WorkflowStep::Triangulation(run) => write!(f, "run_{}_triangulation", run),
            WorkflowStep::MetaEnsemble => write!(f, "meta_ensemble"),
            WorkflowStep::Completed => write!(f, "completed"),
            WorkflowStep::MetaEnsembleFailed => write!(f, "meta_ensemble_failed"),
            WorkflowStep::Failed => write!(f, "failed"),
            WorkflowStep::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(WorkflowStep::Extraction(2).to_string(), "run_2_extraction");
        assert_eq!(WorkflowStep::Triangulation(3).to_string(), "run_3_triangulation");
        assert_eq!(WorkflowStep::MetaEnsembleFailed.to_string(), "meta_ensemble_failed");
    }

    #[test]
    fn test_terminal_steps() {
        assert!(WorkflowStep::Completed.is_terminal());
        assert!(WorkflowStep::Cancelled.is_terminal());
        assert!(!WorkflowStep::Extraction(1).is_terminal());
        assert!(!WorkflowStep::MetaEnsemble.is_terminal());
    }
}

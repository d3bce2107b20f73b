//! Workflow parameters: orchestrator loop control.
//!
//! [`WorkflowParams`] groups the static parameters that control
//! [`RunWorkflowUseCase`](crate::use_cases::run_workflow::RunWorkflowUseCase).
//! The run count itself is fixed by the protocol and is not configurable.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use triangulation_domain::RUN_COUNT;

/// Orchestrator control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParams {
    /// Extract a run's sources concurrently instead of one after another.
    pub parallel_sources: bool,
    /// Successful runs required before the meta-ensemble is attempted.
    pub min_successful_runs: usize,
    /// Per-call timeout applied around every model invocation.
    pub model_timeout: Option<Duration>,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            parallel_sources: false,
            min_successful_runs: 1,
            model_timeout: None,
        }
    }
}

impl WorkflowParams {
    // ==================== Builder Methods ====================

    pub fn with_parallel_sources(mut self, parallel: bool) -> Self {
        self.parallel_sources = parallel;
        self
    }

    /// Clamped to `1..=RUN_COUNT`.
    pub fn with_min_successful_runs(mut self, min: usize) -> Self {
        self.min_successful_runs = min.clamp(1, RUN_COUNT);
        self
    }

    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }
}

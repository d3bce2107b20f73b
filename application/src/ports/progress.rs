//! Progress notification port
//!
//! Defines the interface for reporting progress during workflow execution.

use triangulation_domain::{RunRecord, SourceKey, SourceStatus, WorkflowStep};

/// Callback for progress updates during workflow execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a run starts
    fn on_run_start(&self, run: u8, total_sources: usize);

    /// Called on every source status transition
    fn on_source_status(&self, run: u8, key: SourceKey, status: SourceStatus);

    /// Called once a run record has been committed
    fn on_run_complete(&self, record: &RunRecord);

    /// Called when the workflow moves to a new step
    fn on_step(&self, _step: WorkflowStep) {}

    /// Called whenever the overall percentage is recomputed
    fn on_progress(&self, _percent: u8) {}

    /// Called for each line appended to the workflow log
    fn on_log(&self, _line: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_run_start(&self, _run: u8, _total_sources: usize) {}
    fn on_source_status(&self, _run: u8, _key: SourceKey, _status: SourceStatus) {}
    fn on_run_complete(&self, _record: &RunRecord) {}
}

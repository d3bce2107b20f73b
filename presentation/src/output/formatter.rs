//! Output formatter trait

use triangulation_domain::WorkflowState;

/// Trait for formatting workflow results
pub trait OutputFormatter {
    /// Format the complete result: final table, every run, summary
    fn format(&self, state: &WorkflowState) -> String;

    /// Format as JSON
    fn format_json(&self, state: &WorkflowState) -> String;

    /// Format the final consensus only (concise output)
    fn format_summary(&self, state: &WorkflowState) -> String;
}

//! Orchestration domain: runs, workflow state and progress.
//!
//! ```text
//! raw source text ─▶ SourceResult ─▶ RunRecord (×3) ─▶ final consensus rows
//! ```
//!
//! Data flows upward through these types; the application layer's
//! orchestrator decides when each stage may start.

pub mod progress;
pub mod run;
pub mod state;
pub mod step;

pub use progress::ProgressModel;
pub use run::{RUN_COUNT, RUN_FAILED_MARKER, RunRecord, TriangulationOutput};
pub use state::{StatePatch, WorkflowState, WorkflowSummary};
pub use step::WorkflowStep;

//! Application-level configuration.
//!
//! - [`WorkflowParams`]: orchestrator control (parallelism, ensemble
//!   threshold, model call timeout)

pub mod workflow_params;

pub use workflow_params::WorkflowParams;

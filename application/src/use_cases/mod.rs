//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod extract_source;
pub mod log_channel;
pub mod meta_ensemble;
pub mod run_workflow;
pub(crate) mod shared;
pub mod stage;
pub mod triangulate;

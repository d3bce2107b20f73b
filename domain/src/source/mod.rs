//! Source domain: the five raw-data categories and their per-run outcomes.
//!
//! - [`SourceKey`] / [`SourceType`]: fixed source set and classification
//! - [`SourceStatus`]: lifecycle of one source within a run
//! - [`SourceResult`]: structured outcome of one source's extraction
//! - [`SourceStatusTracker`]: decides when a run may be aggregated

pub mod key;
pub mod result;
pub mod status;
pub mod tracker;

pub use key::{SourceKey, SourceType};
pub use result::{SourceExtraction, SourceResult};
pub use status::SourceStatus;
pub use tracker::{Readiness, SourceStatusTracker};

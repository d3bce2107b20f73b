//! Domain layer for spec-triangulation
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Sources
//!
//! Five fixed raw-data categories ([`SourceKey`]) are extracted independently
//! into [`SourceResult`]s. The [`SourceStatusTracker`] decides when a run has
//! heard back from every uploaded source.
//!
//! ## Triangulation / Meta-ensemble
//!
//! - **Triangulation**: one run's completed sources are reconciled into a
//!   ranked table ([`RunRecord`])
//! - **Meta-ensemble**: three run tables are reconciled into the final
//!   consensus, ranked by [`ConfidenceTier`]
//!
//! Every model answer goes through the [`TableParser`], which never fails.

pub mod consensus;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod source;
pub mod spec;

// Re-export commonly used types
pub use consensus::{ConfidenceTier, ConsensusTally};
pub use core::{error::DomainError, string::truncate};
pub use orchestration::{
    ProgressModel, RUN_COUNT, RUN_FAILED_MARKER, RunRecord, StatePatch, TriangulationOutput,
    WorkflowState, WorkflowStep, WorkflowSummary,
};
pub use prompt::PromptTemplate;
pub use source::{
    Readiness, SourceExtraction, SourceKey, SourceResult, SourceStatus, SourceStatusTracker,
    SourceType,
};
pub use spec::{ParseProfile, PricingImpact, SpecRow, TABLE_COLUMNS, TableParser};

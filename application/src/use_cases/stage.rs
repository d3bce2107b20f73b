//! Errors shared by the triangulation and meta-ensemble stages.

use crate::ports::llm_gateway::GatewayError;
use thiserror::Error;
use triangulation_domain::DomainError;

/// Failure of a stage that the stage itself cannot absorb.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// Precondition violated (no completed sources, wrong run count).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The model call failed.
    #[error("Model invocation failed: {0}")]
    Invocation(#[from] GatewayError),
}

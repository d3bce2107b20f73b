//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Triangulation was attempted with zero completed sources.
    #[error("No completed source results to triangulate")]
    NoCompletedSources,

    /// The meta-ensemble requires an exact number of run records.
    #[error("Expected {expected} run results, got {actual}")]
    RunCountMismatch { expected: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A source result was moved out of a terminal status.
    #[error("Invalid status transition for {source_key}: {from} -> {to}")]
    InvalidTransition {
        source_key: String,
        from: String,
        to: String,
    },

    #[error("Unknown source key: {0}")]
    UnknownSource(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_count_mismatch_display() {
        let error = DomainError::RunCountMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(error.to_string(), "Expected 3 run results, got 2");
    }
}

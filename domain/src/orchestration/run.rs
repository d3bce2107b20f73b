//! Run records: the committed outcome of one orchestrator iteration.

use crate::source::{SourceKey, SourceResult};
use crate::spec::SpecRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of independent runs in the protocol.
pub const RUN_COUNT: usize = 3;

/// `triangulated_text` of a run whose triangulation did not happen or failed.
pub const RUN_FAILED_MARKER: &str = "Run failed";

/// One completed run: per-source outcomes plus the triangulated table.
///
/// Never mutated after it is appended to the workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// 1-indexed
    pub run_number: u8,
    pub triangulated_text: String,
    pub triangulated_rows: Vec<SpecRow>,
    pub per_source_results: BTreeMap<SourceKey, SourceResult>,
    pub succeeded: bool,
}

impl RunRecord {
    pub fn succeeded(
        run_number: u8,
        triangulated_text: impl Into<String>,
        triangulated_rows: Vec<SpecRow>,
        per_source_results: BTreeMap<SourceKey, SourceResult>,
    ) -> Self {
        Self {
            run_number,
            triangulated_text: triangulated_text.into(),
            triangulated_rows,
            per_source_results,
            succeeded: true,
        }
    }

    /// A run that produced no triangulated table.
    pub fn failed(run_number: u8, per_source_results: BTreeMap<SourceKey, SourceResult>) -> Self {
        Self {
            run_number,
            triangulated_text: RUN_FAILED_MARKER.to_string(),
            triangulated_rows: Vec::new(),
            per_source_results,
            succeeded: false,
        }
    }

    /// Sources that completed in this run, in canonical key order.
    pub fn completed_sources(&self) -> impl Iterator<Item = &SourceResult> {
        self.per_source_results.values().filter(|r| r.is_completed())
    }
}

/// Triangulation output before it is attached to its run.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationOutput {
    pub triangulated_text: String,
    pub triangulated_rows: Vec<SpecRow>,
}

impl TriangulationOutput {
    /// The failure marker: "Run failed", no rows.
    pub fn failed() -> Self {
        Self {
            triangulated_text: RUN_FAILED_MARKER.to_string(),
            triangulated_rows: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.triangulated_text == RUN_FAILED_MARKER && self.triangulated_rows.is_empty()
    }

    /// Attach to a run, deriving `succeeded` from the failure marker.
    pub fn into_record(
        self,
        run_number: u8,
        per_source_results: BTreeMap<SourceKey, SourceResult>,
    ) -> RunRecord {
        if self.is_failed() {
            RunRecord::failed(run_number, per_source_results)
        } else {
            RunRecord::succeeded(
                run_number,
                self.triangulated_text,
                self.triangulated_rows,
                per_source_results,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ParseProfile, TableParser};

    #[test]
    fn test_failed_record_uses_marker() {
        let record = RunRecord::failed(2, BTreeMap::new());
        assert_eq!(record.triangulated_text, "Run failed");
        assert!(!record.succeeded);
        assert!(record.triangulated_rows.is_empty());
    }

    #[test]
    fn test_output_into_record() {
        let text = "| Material | Steel, Iron | Durability | ✅ Yes |";
        let output = TriangulationOutput {
            triangulated_text: text.to_string(),
            triangulated_rows: TableParser::parse(text, &ParseProfile::triangulation()),
        };
        let record = output.into_record(1, BTreeMap::new());
        assert!(record.succeeded);
        assert_eq!(record.run_number, 1);

        let record = TriangulationOutput::failed().into_record(3, BTreeMap::new());
        assert!(!record.succeeded);
    }
}

//! Workflow state and its reducer.
//!
//! [`WorkflowState`] is the single aggregate a workflow invocation owns.
//! Stages never mutate it; they describe what changed in a [`StatePatch`]
//! and the orchestrator folds the patch in with [`WorkflowState::merge`]:
//!
//! | Field | Merge rule |
//! |-------|------------|
//! | `sources` | per key overwrite |
//! | `run_record` | append (at most [`RUN_COUNT`]) |
//! | `final_result` | overwrite, only once all runs are recorded |
//! | `current_run`, `current_step` | overwrite |
//! | `progress_percentage` | overwrite, never decreases |
//! | `log` | concatenate |

use super::progress::ProgressModel;
use super::run::{RUN_COUNT, RunRecord};
use super::step::WorkflowStep;
use crate::core::error::DomainError;
use crate::source::{SourceKey, SourceResult, SourceStatus};
use crate::spec::SpecRow;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Partial update produced by a stage.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub sources: BTreeMap<SourceKey, SourceResult>,
    pub run_record: Option<RunRecord>,
    pub final_result: Option<(String, Vec<SpecRow>)>,
    pub current_run: Option<u8>,
    pub current_step: Option<WorkflowStep>,
    pub progress_percentage: Option<u8>,
    pub log: Vec<String>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, result: SourceResult) -> Self {
        self.sources.insert(result.key, result);
        self
    }

    pub fn with_run_record(mut self, record: RunRecord) -> Self {
        self.run_record = Some(record);
        self
    }

    pub fn with_final_result(mut self, text: impl Into<String>, rows: Vec<SpecRow>) -> Self {
        self.final_result = Some((text.into(), rows));
        self
    }

    pub fn with_run(mut self, run: u8) -> Self {
        self.current_run = Some(run);
        self
    }

    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.current_step = Some(step);
        self
    }

    pub fn with_progress(mut self, percent: u8) -> Self {
        self.progress_percentage = Some(percent);
        self
    }

    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.log.push(line.into());
        self
    }
}

/// Counts handed to the export collaborator's summary sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowSummary {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub final_consensus_specs: usize,
    pub total_datasets_processed: usize,
}

/// Top-level aggregate for one workflow invocation.
///
/// Invariants:
/// - `uploaded_sources` never changes after construction
/// - every one of the five source keys has a [`SourceResult`]
/// - `run_records` grows monotonically from 0 to [`RUN_COUNT`]
/// - `final_rows` is non-empty only after all runs are recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    product_name: String,
    uploaded_sources: BTreeSet<SourceKey>,
    sources: BTreeMap<SourceKey, SourceResult>,
    run_records: Vec<RunRecord>,
    final_text: String,
    final_rows: Vec<SpecRow>,
    current_run: u8,
    current_step: WorkflowStep,
    progress_percentage: u8,
    log: Vec<String>,
}

impl WorkflowState {
    /// Create the initial state.
    ///
    /// Fails when the product name is blank or nothing was uploaded.
    pub fn new(
        product_name: impl Into<String>,
        uploaded_sources: BTreeSet<SourceKey>,
    ) -> Result<Self, DomainError> {
        let product_name = product_name.into().trim().to_string();
        if product_name.is_empty() {
            return Err(DomainError::InvalidInput(
                "product name cannot be empty".to_string(),
            ));
        }
        if uploaded_sources.is_empty() {
            return Err(DomainError::InvalidInput(
                "at least one source must be uploaded".to_string(),
            ));
        }

        let sources = Self::fresh_sources(&uploaded_sources);
        let log = vec![format!(
            "Initialized meta-ensemble workflow for product: {}",
            product_name
        )];

        Ok(Self {
            product_name,
            uploaded_sources,
            sources,
            run_records: Vec::new(),
            final_text: String::new(),
            final_rows: Vec::new(),
            current_run: 0,
            current_step: WorkflowStep::Initialization,
            progress_percentage: 0,
            log,
        })
    }

    /// One result per key: `idle` if uploaded, `not_uploaded` otherwise.
    pub fn fresh_sources(uploaded: &BTreeSet<SourceKey>) -> BTreeMap<SourceKey, SourceResult> {
        SourceKey::ALL
            .into_iter()
            .map(|key| (key, SourceResult::initial(key, uploaded.contains(&key))))
            .collect()
    }

    /// Fold a patch into the state, returning the new state.
    pub fn merge(mut self, patch: StatePatch) -> Result<Self, DomainError> {
        for (key, result) in patch.sources {
            self.sources.insert(key, result);
        }

        if let Some(record) = patch.run_record {
            if self.run_records.len() >= RUN_COUNT {
                return Err(DomainError::RunCountMismatch {
                    expected: RUN_COUNT,
                    actual: self.run_records.len() + 1,
                });
            }
            self.run_records.push(record);
        }

        if let Some((text, rows)) = patch.final_result {
            if self.run_records.len() != RUN_COUNT {
                return Err(DomainError::RunCountMismatch {
                    expected: RUN_COUNT,
                    actual: self.run_records.len(),
                });
            }
            self.final_text = text;
            self.final_rows = rows;
        }

        if let Some(run) = patch.current_run {
            self.current_run = run;
        }
        if let Some(step) = patch.current_step {
            self.current_step = step;
        }
        if let Some(pct) = patch.progress_percentage {
            self.progress_percentage = self.progress_percentage.max(pct.min(ProgressModel::COMPLETE));
        }

        self.log.extend(patch.log);
        Ok(self)
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn uploaded_sources(&self) -> &BTreeSet<SourceKey> {
        &self.uploaded_sources
    }

    /// Source results of the current run.
    pub fn sources(&self) -> &BTreeMap<SourceKey, SourceResult> {
        &self.sources
    }

    pub fn source(&self, key: SourceKey) -> Option<&SourceResult> {
        self.sources.get(&key)
    }

    /// Status view used by the source status tracker.
    pub fn statuses(&self) -> BTreeMap<SourceKey, SourceStatus> {
        self.sources
            .iter()
            .map(|(key, result)| (*key, result.status))
            .collect()
    }

    /// Completed sources of the current run.
    pub fn completed_sources(&self) -> BTreeMap<SourceKey, SourceResult> {
        self.sources
            .iter()
            .filter(|(_, result)| result.is_completed())
            .map(|(key, result)| (*key, result.clone()))
            .collect()
    }

    pub fn run_records(&self) -> &[RunRecord] {
        &self.run_records
    }

    pub fn successful_runs(&self) -> usize {
        self.run_records.iter().filter(|r| r.succeeded).count()
    }

    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    pub fn final_rows(&self) -> &[SpecRow] {
        &self.final_rows
    }

    pub fn current_run(&self) -> u8 {
        self.current_run
    }

    pub fn current_step(&self) -> WorkflowStep {
        self.current_step
    }

    pub fn progress_percentage(&self) -> u8 {
        self.progress_percentage
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_completed(&self) -> bool {
        self.current_step == WorkflowStep::Completed
    }

    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            total_runs: self.run_records.len(),
            successful_runs: self.successful_runs(),
            final_consensus_specs: self.final_rows.len(),
            total_datasets_processed: self.uploaded_sources.len(),
        }
    }
}

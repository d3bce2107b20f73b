//! Run Workflow use case
//!
//! Drives the fixed three-run protocol: per run, every uploaded source is
//! extracted, the tracker decides whether the run can be triangulated, and
//! the resulting [`RunRecord`] is committed. After the third run the
//! meta-ensemble merges the run tables into the final consensus.
//!
//! All state changes go through [`WorkflowState::merge`]; stage log lines
//! arrive over a [`LogChannel`] and are drained into the state on every
//! commit. The caller always gets the last committed state back, even when
//! the workflow fails or is cancelled.

use super::log_channel::LogChannel;
use super::meta_ensemble::MetaEnsembleStage;
use super::shared::{cancelled, is_cancelled};
use super::stage::StageError;
use super::triangulate::TriangulationStage;
use crate::config::WorkflowParams;
use crate::ports::conversation_logger::ConversationLogger;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::source_extractor::{SourceExtractionError, SourceExtractor};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use triangulation_domain::{
    DomainError, ProgressModel, RUN_COUNT, Readiness, RunRecord, SourceExtraction, SourceKey,
    SourceResult, SourceStatusTracker, StatePatch, WorkflowState, WorkflowStep,
};

/// Pipeline-level failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunWorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Only {successful} of 3 runs succeeded; {required} required for the meta-ensemble")]
    InsufficientRuns { required: usize, successful: usize },

    #[error("Meta-ensemble failed: {0}")]
    EnsembleFailed(StageError),

    #[error("Workflow cancelled")]
    Cancelled,

    #[error("Workflow state error: {0}")]
    State(#[from] DomainError),
}

/// Input for the RunWorkflow use case
#[derive(Debug, Clone)]
pub struct RunWorkflowInput {
    pub product_name: String,
    /// Raw text per uploaded source; absent keys are `not_uploaded`
    pub sources: BTreeMap<SourceKey, String>,
}

impl RunWorkflowInput {
    pub fn new(product_name: impl Into<String>, sources: BTreeMap<SourceKey, String>) -> Self {
        Self {
            product_name: product_name.into(),
            sources,
        }
    }

    pub fn uploaded(&self) -> BTreeSet<SourceKey> {
        self.sources.keys().copied().collect()
    }
}

/// Final state of a workflow plus the pipeline-level error, if any.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub state: WorkflowState,
    pub error: Option<RunWorkflowError>,
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.state.is_completed()
    }

    pub fn into_result(self) -> Result<WorkflowState, (WorkflowState, RunWorkflowError)> {
        match self.error {
            None => Ok(self.state),
            Some(e) => Err((self.state, e)),
        }
    }
}

/// Use case for running the three-run triangulation workflow
pub struct RunWorkflowUseCase<G: LlmGateway + 'static, E: SourceExtractor + 'static> {
    extractor: Arc<E>,
    triangulation: TriangulationStage<G>,
    ensemble: MetaEnsembleStage<G>,
    params: WorkflowParams,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static, E: SourceExtractor + 'static> RunWorkflowUseCase<G, E> {
    pub fn new(gateway: Arc<G>, extractor: Arc<E>) -> Self {
        Self {
            extractor,
            triangulation: TriangulationStage::new(Arc::clone(&gateway)),
            ensemble: MetaEnsembleStage::new(gateway),
            params: WorkflowParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: WorkflowParams) -> Self {
        self.triangulation = self.triangulation.with_timeout(params.model_timeout);
        self.ensemble = self.ensemble.with_timeout(params.model_timeout);
        self.params = params;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.triangulation = self
            .triangulation
            .with_conversation_logger(Arc::clone(&logger));
        self.ensemble = self.ensemble.with_conversation_logger(logger);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunWorkflowInput,
    ) -> Result<WorkflowOutcome, RunWorkflowError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Returns `Err` only when the input is rejected before any state
    /// exists; every later failure comes back inside the outcome.
    pub async fn execute_with_progress(
        &self,
        input: RunWorkflowInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<WorkflowOutcome, RunWorkflowError> {
        let state = WorkflowState::new(input.product_name.as_str(), input.uploaded())
            .map_err(|e| RunWorkflowError::InvalidInput(e.to_string()))?;

        info!(
            "Starting triangulation workflow for '{}' with {} source(s)",
            state.product_name(),
            state.uploaded_sources().len()
        );
        for line in state.log() {
            progress.on_log(line);
        }

        let started = Instant::now();
        let mut workflow = WorkflowRun {
            model: ProgressModel::new(state.uploaded_sources().len()),
            state,
            channel: LogChannel::new(),
            progress,
        };

        let error = match self.run_protocol(&mut workflow, &input).await {
            Ok(()) => None,
            Err(RunWorkflowError::Cancelled) => {
                warn!("Workflow cancelled");
                let run = workflow.state.current_run();
                if let Err(e) = workflow.commit(
                    StatePatch::new()
                        .with_step(WorkflowStep::Cancelled)
                        .with_log(format!("Workflow cancelled during run {}", run)),
                ) {
                    warn!("Could not record cancellation, keeping last committed state: {}", e);
                }
                Some(RunWorkflowError::Cancelled)
            }
            Err(e) => {
                warn!("Workflow ended with error: {}", e);
                Some(e)
            }
        };

        info!(
            "Workflow finished in {:.2}s at step {}",
            started.elapsed().as_secs_f64(),
            workflow.state.current_step()
        );

        Ok(WorkflowOutcome {
            state: workflow.state,
            error,
        })
    }

    async fn run_protocol(
        &self,
        workflow: &mut WorkflowRun<'_>,
        input: &RunWorkflowInput,
    ) -> Result<(), RunWorkflowError> {
        for run in 1..=RUN_COUNT as u8 {
            self.check_cancelled()?;
            let record = self.execute_run(workflow, input, run).await?;
            workflow.progress.on_run_complete(&record);

            let line = if record.succeeded {
                format!("Run {} completed", run)
            } else {
                format!("Run {} failed", run)
            };
            let pct = workflow.model.percent(run as usize, 0);
            workflow.commit(
                StatePatch::new()
                    .with_run_record(record)
                    .with_progress(pct)
                    .with_log(line),
            )?;
        }

        self.finish(workflow).await
    }

    /// One iteration: reset, extract, decide, triangulate.
    async fn execute_run(
        &self,
        workflow: &mut WorkflowRun<'_>,
        input: &RunWorkflowInput,
        run: u8,
    ) -> Result<RunRecord, RunWorkflowError> {
        info!("Run {}/{}: extracting sources", run, RUN_COUNT);
        let uploaded = workflow.state.uploaded_sources().clone();

        let mut reset = StatePatch::new()
            .with_run(run)
            .with_step(WorkflowStep::Extraction(run))
            .with_log(format!("Starting run {} of {}", run, RUN_COUNT));
        reset.sources = WorkflowState::fresh_sources(&uploaded);
        workflow.commit(reset)?;
        workflow.progress.on_run_start(run, uploaded.len());

        if self.params.parallel_sources {
            self.extract_parallel(workflow, input, run).await?;
        } else {
            self.extract_sequential(workflow, input, run).await?;
        }

        let decision =
            SourceStatusTracker::decide(workflow.state.uploaded_sources(), &workflow.state.statuses());
        debug!("Run {}: tracker decided {}", run, decision);

        let sources = workflow.state.sources().clone();
        match decision {
            Readiness::Triangulate => {}
            Readiness::AllFailed => {
                warn!("Run {}: every uploaded source failed", run);
                workflow.commit(StatePatch::new().with_log(format!(
                    "Run {}: all uploaded sources failed; skipping triangulation",
                    run
                )))?;
                return Ok(RunRecord::failed(run, sources));
            }
            Readiness::Wait => {
                warn!("Run {}: sources still pending after extraction", run);
                workflow.commit(StatePatch::new().with_log(format!(
                    "Run {}: sources still pending; recording run as failed",
                    run
                )))?;
                return Ok(RunRecord::failed(run, sources));
            }
        }

        workflow.commit(StatePatch::new().with_step(WorkflowStep::Triangulation(run)))?;

        let completed = workflow.state.completed_sources();
        let sender = workflow.channel.sender("triangulation");
        let product = workflow.state.product_name().to_string();
        let result = tokio::select! {
            _ = cancelled(&self.cancellation_token) => return Err(RunWorkflowError::Cancelled),
            result = self.triangulation.run(&product, run, &completed, &sender) => result,
        };

        match result {
            Ok(output) => Ok(output.into_record(run, sources)),
            Err(e) => {
                warn!("Run {}: triangulation rejected: {}", run, e);
                workflow.commit(
                    StatePatch::new().with_log(format!("Run {}: triangulation rejected: {}", run, e)),
                )?;
                Ok(RunRecord::failed(run, sources))
            }
        }
    }

    async fn extract_sequential(
        &self,
        workflow: &mut WorkflowRun<'_>,
        input: &RunWorkflowInput,
        run: u8,
    ) -> Result<(), RunWorkflowError> {
        let uploaded: Vec<SourceKey> = workflow.state.uploaded_sources().iter().copied().collect();
        let product = workflow.state.product_name().to_string();

        for (done, key) in uploaded.into_iter().enumerate() {
            self.check_cancelled()?;
            let mut result = workflow.begin_processing(run, key)?;

            let raw = input.sources.get(&key).map(String::as_str).unwrap_or_default();
            let start = Instant::now();
            let outcome = tokio::select! {
                _ = cancelled(&self.cancellation_token) => return Err(RunWorkflowError::Cancelled),
                outcome = self.extractor.extract(&product, key, raw) => outcome,
            };
            let elapsed = start.elapsed().as_secs_f64();

            let line = apply_extraction(&mut result, outcome, elapsed)?;
            workflow.finish_source(run, result, done + 1, line)?;
        }
        Ok(())
    }

    /// Extract every source concurrently; statuses are still committed in
    /// key order once all tasks have reported back.
    async fn extract_parallel(
        &self,
        workflow: &mut WorkflowRun<'_>,
        input: &RunWorkflowInput,
        run: u8,
    ) -> Result<(), RunWorkflowError> {
        let uploaded: Vec<SourceKey> = workflow.state.uploaded_sources().iter().copied().collect();
        let product = workflow.state.product_name().to_string();

        let mut processing = BTreeMap::new();
        for &key in &uploaded {
            processing.insert(key, workflow.begin_processing(run, key)?);
        }

        let mut join_set = JoinSet::new();
        for &key in &uploaded {
            let extractor = Arc::clone(&self.extractor);
            let product = product.clone();
            let raw = input.sources.get(&key).cloned().unwrap_or_default();
            join_set.spawn(async move {
                let start = Instant::now();
                let outcome = extractor.extract(&product, key, &raw).await;
                (key, outcome, start.elapsed().as_secs_f64())
            });
        }

        let mut outcomes = BTreeMap::new();
        loop {
            let next = tokio::select! {
                _ = cancelled(&self.cancellation_token) => {
                    join_set.abort_all();
                    return Err(RunWorkflowError::Cancelled);
                }
                next = join_set.join_next() => next,
            };
            match next {
                Some(Ok((key, outcome, elapsed))) => {
                    outcomes.insert(key, (outcome, elapsed));
                }
                Some(Err(e)) => warn!("Run {}: extraction task failed: {}", run, e),
                None => break,
            }
        }

        for (done, (key, mut result)) in processing.into_iter().enumerate() {
            let (outcome, elapsed) = outcomes.remove(&key).unwrap_or_else(|| {
                (
                    Err(SourceExtractionError::Other(
                        "extraction task did not complete".to_string(),
                    )),
                    0.0,
                )
            });
            let line = apply_extraction(&mut result, outcome, elapsed)?;
            workflow.finish_source(run, result, done + 1, line)?;
        }
        Ok(())
    }

    /// Threshold check, then the meta-ensemble.
    async fn finish(&self, workflow: &mut WorkflowRun<'_>) -> Result<(), RunWorkflowError> {
        let successful = workflow.state.successful_runs();
        // At least one run must succeed whatever the caller configured.
        let required = self.params.min_successful_runs.clamp(1, RUN_COUNT);
        if successful < required {
            let error = RunWorkflowError::InsufficientRuns {
                required,
                successful,
            };
            warn!("{}", error);
            workflow.commit(
                StatePatch::new()
                    .with_step(WorkflowStep::Failed)
                    .with_log(error.to_string()),
            )?;
            return Err(error);
        }

        self.check_cancelled()?;
        info!("Meta-ensemble over {} successful run(s)", successful);
        workflow.commit(
            StatePatch::new()
                .with_step(WorkflowStep::MetaEnsemble)
                .with_log(format!(
                    "Starting meta-ensemble over {} successful run(s)",
                    successful
                )),
        )?;

        let sender = workflow.channel.sender("meta_ensemble");
        let product = workflow.state.product_name().to_string();
        let result = tokio::select! {
            _ = cancelled(&self.cancellation_token) => return Err(RunWorkflowError::Cancelled),
            result = self.ensemble.run(&product, workflow.state.run_records(), &sender) => result,
        };

        match result {
            Ok(output) => {
                let rows = output.final_rows.len();
                workflow.commit(
                    StatePatch::new()
                        .with_final_result(output.final_text, output.final_rows)
                        .with_step(WorkflowStep::Completed)
                        .with_progress(ProgressModel::COMPLETE)
                        .with_log(format!(
                            "Workflow completed with {} consensus specification(s)",
                            rows
                        )),
                )?;
                Ok(())
            }
            Err(e) => {
                workflow.commit(StatePatch::new().with_step(WorkflowStep::MetaEnsembleFailed))?;
                Err(RunWorkflowError::EnsembleFailed(e))
            }
        }
    }

    fn check_cancelled(&self) -> Result<(), RunWorkflowError> {
        if is_cancelled(&self.cancellation_token) {
            return Err(RunWorkflowError::Cancelled);
        }
        Ok(())
    }
}

/// Move a processing source to its terminal status; returns the log line.
fn apply_extraction(
    result: &mut SourceResult,
    outcome: Result<SourceExtraction, SourceExtractionError>,
    elapsed: f64,
) -> Result<String, DomainError> {
    let name = result.key.display_name();
    match outcome {
        Ok(extraction) => {
            let line = format!(
                "{}: extracted {} specification(s) from {} row(s) in {:.2}s",
                name,
                extraction.parsed_rows.len(),
                extraction.raw_row_count,
                extraction.processing_time
            );
            result.complete(extraction)?;
            Ok(line)
        }
        Err(e) => {
            warn!("{} extraction failed: {}", result.key, e);
            result.fail(e.to_string(), elapsed)?;
            Ok(format!("{}: extraction failed: {}", name, e))
        }
    }
}

/// Mutable side of one workflow invocation, owned by the orchestrator.
struct WorkflowRun<'a> {
    state: WorkflowState,
    model: ProgressModel,
    channel: LogChannel,
    progress: &'a dyn ProgressNotifier,
}

impl WorkflowRun<'_> {
    /// Drain stage logs into `patch` and fold it into the state.
    ///
    /// On error the previously committed state is kept.
    fn commit(&mut self, mut patch: StatePatch) -> Result<(), DomainError> {
        let mut lines: Vec<String> = self.channel.drain().into_iter().map(|e| e.line).collect();
        lines.append(&mut patch.log);
        patch.log = lines;

        let step = patch.current_step;
        let pct = patch.progress_percentage;
        let new_lines = patch.log.clone();

        self.state = self.state.clone().merge(patch)?;

        for line in &new_lines {
            self.progress.on_log(line);
        }
        if let Some(step) = step {
            self.progress.on_step(step);
        }
        if pct.is_some() {
            self.progress.on_progress(self.state.progress_percentage());
        }
        Ok(())
    }

    fn begin_processing(&mut self, run: u8, key: SourceKey) -> Result<SourceResult, DomainError> {
        let mut result = self
            .state
            .source(key)
            .cloned()
            .unwrap_or_else(|| SourceResult::idle(key));
        result.begin_processing()?;
        let status = result.status;
        self.commit(StatePatch::new().with_source(result.clone()))?;
        self.progress.on_source_status(run, key, status);
        Ok(result)
    }

    fn finish_source(
        &mut self,
        run: u8,
        result: SourceResult,
        units_in_run: usize,
        line: String,
    ) -> Result<(), DomainError> {
        let key = result.key;
        let status = result.status;
        let pct = self.model.percent(run as usize - 1, units_in_run);
        self.commit(
            StatePatch::new()
                .with_source(result)
                .with_progress(pct)
                .with_log(line),
        )?;
        self.progress.on_source_status(run, key, status);
        Ok(())
    }
}

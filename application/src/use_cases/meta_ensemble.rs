//! Cross-run meta-ensemble stage.
//!
//! Merges the three per-run tables into the final consensus table. This is
//! the last step of the protocol, so unlike triangulation an invocation
//! fault is returned to the caller.

use super::log_channel::LogSender;
use super::shared::invoke_model;
use super::stage::StageError;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use triangulation_domain::{
    DomainError, ParseProfile, PromptTemplate, RUN_COUNT, RunRecord, SpecRow, TableParser,
};

/// Final consensus produced by the ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleOutput {
    pub final_text: String,
    /// Never empty; the sentinel row when the answer could not be parsed.
    pub final_rows: Vec<SpecRow>,
}

pub struct MetaEnsembleStage<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    logger: Arc<dyn ConversationLogger>,
    timeout: Option<Duration>,
}

impl<G: LlmGateway + 'static> MetaEnsembleStage<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            logger: Arc::new(NoConversationLogger),
            timeout: None,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ensemble exactly [`RUN_COUNT`] run records.
    pub async fn run(
        &self,
        product_name: &str,
        records: &[RunRecord],
        log: &LogSender,
    ) -> Result<EnsembleOutput, StageError> {
        if records.len() != RUN_COUNT {
            return Err(DomainError::RunCountMismatch {
                expected: RUN_COUNT,
                actual: records.len(),
            }
            .into());
        }

        let usable = records.iter().filter(|r| r.succeeded).count();
        info!(
            "Meta-ensemble over {} runs ({} usable)",
            records.len(),
            usable
        );

        let prompt = PromptTemplate::ensemble_prompt(product_name, records);
        let response = match invoke_model(
            self.gateway.as_ref(),
            self.logger.as_ref(),
            "meta_ensemble",
            &prompt,
            self.timeout,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Meta-ensemble failed: {}", e);
                log.send(format!("Meta-ensemble triangulation failed: {}", e));
                return Err(e.into());
            }
        };

        let final_rows = TableParser::parse(&response.text, &ParseProfile::ensemble());
        log.send(format!(
            "Meta-ensemble triangulation completed successfully in {:.2}s",
            response.elapsed
        ));
        info!(
            "Meta-ensemble produced {} consensus row(s) in {:.2}s",
            final_rows.len(),
            response.elapsed
        );

        Ok(EnsembleOutput {
            final_text: response.text,
            final_rows,
        })
    }
}

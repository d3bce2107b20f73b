//! Per-run triangulation stage.
//!
//! Aggregates every completed source of one run into a single ranked table.
//! A model failure here never propagates: the run is marked failed and the
//! orchestrator moves on to the next one.

use super::log_channel::LogSender;
use super::shared::invoke_model;
use super::stage::StageError;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use triangulation_domain::{
    DomainError, ParseProfile, PromptTemplate, SourceKey, SourceResult, TableParser,
    TriangulationOutput,
};

pub struct TriangulationStage<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    logger: Arc<dyn ConversationLogger>,
    timeout: Option<Duration>,
}

impl<G: LlmGateway + 'static> TriangulationStage<G> {
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

    /// Triangulate one run.
    ///
    /// Only an empty `completed` map is an error. Any invocation fault is
    /// returned as [`TriangulationOutput::failed`].
    pub async fn run(
        &self,
        product_name: &str,
        run_number: u8,
        completed: &BTreeMap<SourceKey, SourceResult>,
        log: &LogSender,
    ) -> Result<TriangulationOutput, StageError> {
        if completed.is_empty() {
            return Err(DomainError::NoCompletedSources.into());
        }

        info!(
            "Run {}: triangulating {} completed source(s)",
            run_number,
            completed.len()
        );

        let prompt = PromptTemplate::triangulation_prompt(product_name, completed);
        let stage = format!("run_{}_triangulation", run_number);

        match invoke_model(
            self.gateway.as_ref(),
            self.logger.as_ref(),
            &stage,
            &prompt,
            self.timeout,
        )
        .await
        {
            Ok(response) => {
                let rows = TableParser::parse(&response.text, &ParseProfile::triangulation());
                log.send(format!(
                    "Triangulation completed successfully in {:.2}s",
                    response.elapsed
                ));
                info!(
                    "Run {}: triangulation produced {} row(s) in {:.2}s",
                    run_number,
                    rows.len(),
                    response.elapsed
                );
                Ok(TriangulationOutput {
                    triangulated_text: response.text,
                    triangulated_rows: rows,
                })
            }
            Err(e) => {
                warn!("Run {}: triangulation failed: {}", run_number, e);
                log.send(format!("Triangulation failed: {}", e));
                Ok(TriangulationOutput::failed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::use_cases::log_channel::LogChannel;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use triangulation_domain::SourceExtraction;

    struct MockGateway {
        responses: Mutex<VecDeque<Result<String, GatewayError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockGateway {
        fn new(responses: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::Other("no scripted response".into())))
        }
    }

    fn completed(key: SourceKey, text: &str) -> SourceResult {
        let mut result = SourceResult::idle(key);
        result.begin_processing().unwrap();
        result
            .complete(SourceExtraction {
                raw_row_count: 2,
                extracted_text: text.to_string(),
                parsed_rows: Vec::new(),
                processing_time: 0.1,
            })
            .unwrap();
        result
    }

    const TABLE: &str = "\
| Specification Name | Top Options (based on data) | Why it matters in the market | Impacts Pricing? |
|--------------------|-----------------------------|------------------------------|------------------|
| Capacity | 1L, 2L (based on data) | Sizing drives choice in the market | ✅ Yes |
| Material | Steel, Glass | Durability | ❌ No |
";

    #[tokio::test]
    async fn test_empty_completed_sources_is_an_error() {
        let stage = TriangulationStage::new(Arc::new(MockGateway::new(vec![])));
        let channel = LogChannel::new();

        let result = stage
            .run("Kettle", 1, &BTreeMap::new(), &channel.sender("triangulation"))
            .await;

        assert_eq!(
            result,
            Err(StageError::Domain(DomainError::NoCompletedSources))
        );
    }

    #[tokio::test]
    async fn test_successful_triangulation_parses_rows() {
        let gateway = Arc::new(MockGateway::new(vec![Ok(TABLE.to_string())]));
        let stage = TriangulationStage::new(Arc::clone(&gateway));
        let mut channel = LogChannel::new();
        let sources = BTreeMap::from([(
            SourceKey::SearchKeywords,
            completed(SourceKey::SearchKeywords, "| Capacity | 1L | big | ✅ |"),
        )]);

        let output = stage
            .run("Kettle", 1, &sources, &channel.sender("triangulation"))
            .await
            .unwrap();

        assert!(!output.is_failed());
        assert_eq!(output.triangulated_rows.len(), 2);
        assert_eq!(output.triangulated_rows[0].top_options, "1L, 2L");
        assert_eq!(output.triangulated_rows[0].rationale, "Sizing drives choice");
        assert_eq!(gateway.prompts.lock().unwrap().len(), 1);

        let logs = channel.drain();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].line.starts_with("Triangulation completed successfully in"));
    }

    #[tokio::test]
    async fn test_invocation_failure_becomes_failure_marker() {
        let gateway = Arc::new(MockGateway::new(vec![Err(GatewayError::ConnectionError(
            "refused".into(),
        ))]));
        let stage = TriangulationStage::new(gateway);
        let mut channel = LogChannel::new();
        let sources = BTreeMap::from([(
            SourceKey::LmsChats,
            completed(SourceKey::LmsChats, "table"),
        )]);

        let output = stage
            .run("Kettle", 2, &sources, &channel.sender("triangulation"))
            .await
            .unwrap();

        assert!(output.is_failed());
        assert_eq!(output.triangulated_text, "Run failed");
        assert!(channel.drain()[0].line.starts_with("Triangulation failed:"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_failure_marker() {
        struct SlowGateway;

        #[async_trait]
        impl LlmGateway for SlowGateway {
            async fn invoke(&self, _prompt: &str) -> Result<String, GatewayError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(TABLE.to_string())
            }
        }

        let stage =
            TriangulationStage::new(Arc::new(SlowGateway)).with_timeout(Some(Duration::from_secs(1)));
        let channel = LogChannel::new();
        let sources = BTreeMap::from([(
            SourceKey::PnsCalls,
            completed(SourceKey::PnsCalls, "table"),
        )]);

        let output = stage
            .run("Kettle", 1, &sources, &channel.sender("triangulation"))
            .await
            .unwrap();

        assert!(output.is_failed());
    }
}

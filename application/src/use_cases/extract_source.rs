//! Default per-source extractor backed by the language model.

use super::shared::invoke_model;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::source_extractor::{SourceExtractionError, SourceExtractor};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use triangulation_domain::{
    ParseProfile, PromptTemplate, SourceExtraction, SourceKey, TableParser,
};

/// Extracts one source's specification table with a single model call.
pub struct ExtractSourceUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    logger: Arc<dyn ConversationLogger>,
    timeout: Option<Duration>,
}

impl<G: LlmGateway + 'static> ExtractSourceUseCase<G> {
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
}

/// Data rows in a raw upload: non-empty lines after the header line.
pub fn count_data_rows(raw_text: &str) -> usize {
    raw_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
        .saturating_sub(1)
}

#[async_trait]
impl<G: LlmGateway + 'static> SourceExtractor for ExtractSourceUseCase<G> {
    async fn extract(
        &self,
        product_name: &str,
        key: SourceKey,
        raw_text: &str,
    ) -> Result<SourceExtraction, SourceExtractionError> {
        let raw_row_count = count_data_rows(raw_text);
        if raw_row_count == 0 {
            return Err(SourceExtractionError::EmptySource(key));
        }

        debug!("Extracting {} ({} rows)", key, raw_row_count);

        let prompt = PromptTemplate::extraction_prompt(product_name, key, raw_text);
        let stage = format!("extraction:{}", key);
        let response = invoke_model(
            self.gateway.as_ref(),
            self.logger.as_ref(),
            &stage,
            &prompt,
            self.timeout,
        )
        .await?;

        let parsed_rows = TableParser::parse(&response.text, &ParseProfile::triangulation());

        Ok(SourceExtraction {
            raw_row_count,
            extracted_text: response.text,
            parsed_rows,
            processing_time: response.elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use std::sync::Mutex;

    struct EchoGateway {
        prompts: Mutex<Vec<String>>,
        answer: Result<String, GatewayError>,
    }

    #[async_trait]
    impl LlmGateway for EchoGateway {
        async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone()
        }
    }

    fn gateway(answer: Result<String, GatewayError>) -> Arc<EchoGateway> {
        Arc::new(EchoGateway {
            prompts: Mutex::new(Vec::new()),
            answer,
        })
    }

    #[test]
    fn test_count_data_rows() {
        assert_eq!(count_data_rows(""), 0);
        assert_eq!(count_data_rows("keyword,pageviews"), 0);
        assert_eq!(count_data_rows("keyword,pageviews\n5 kva,120\n\n7.5 kva,80\n"), 2);
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected_without_model_call() {
        let gw = gateway(Ok(String::new()));
        let extractor = ExtractSourceUseCase::new(Arc::clone(&gw));

        let result = extractor
            .extract("Generator", SourceKey::SearchKeywords, "keyword,pageviews\n")
            .await;

        assert_eq!(
            result,
            Err(SourceExtractionError::EmptySource(SourceKey::SearchKeywords))
        );
        assert!(gw.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_parses_model_table() {
        let gw = gateway(Ok(
            "| Power Rating | 5 KVA, 7.5 KVA (based on data) | Sizing | ✅ Yes |".to_string(),
        ));
        let extractor = ExtractSourceUseCase::new(Arc::clone(&gw));

        let extraction = extractor
            .extract("Generator", SourceKey::LmsChats, "message\nneed 5 kva\nneed 7.5 kva")
            .await
            .unwrap();

        assert_eq!(extraction.raw_row_count, 2);
        assert_eq!(extraction.parsed_rows.len(), 1);
        assert_eq!(extraction.parsed_rows[0].top_options, "5 KVA, 7.5 KVA");
        assert!(gw.prompts.lock().unwrap()[0].contains("need 5 kva"));
    }

    #[tokio::test]
    async fn test_gateway_error_is_wrapped() {
        let gw = gateway(Err(GatewayError::EmptyResponse));
        let extractor = ExtractSourceUseCase::new(gw);

        let result = extractor
            .extract("Generator", SourceKey::PnsCalls, "transcript\nhello")
            .await;

        assert_eq!(
            result,
            Err(SourceExtractionError::Gateway(GatewayError::EmptyResponse))
        );
    }
}

//! OpenAI-compatible LLM Gateway implementation

use super::error::{OpenAiError, Result};
use super::protocol::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope, Message};
use crate::config::FileLlmConfig;
use async_trait::async_trait;
use triangulation_application::{GatewayError, LlmGateway};
use triangulation_domain::PromptTemplate;
use tracing::{debug, info};

/// LLM Gateway for any endpoint speaking the chat completions protocol
pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiGateway {
    /// Build a gateway from the `[llm]` config section.
    ///
    /// Fails when no API key can be resolved.
    pub fn from_config(config: &FileLlmConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| OpenAiError::MissingApiKey(config.api_key_env.clone()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!("OpenAiGateway initialized (model: {})", config.model);

        Ok(Self {
            client,
            endpoint: Self::endpoint(&config.base_url),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }

    fn request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(PromptTemplate::system()),
                Message::user(prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("POST {} ({} bytes)", self.endpoint, prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.into_text().ok_or(OpenAiError::EmptyResponse)
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn invoke(&self, prompt: &str) -> std::result::Result<String, GatewayError> {
        self.complete(prompt).await.map_err(GatewayError::from)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

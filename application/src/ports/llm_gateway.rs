//! LLM Gateway port
//!
//! Defines the interface for communicating with the language model. The
//! workflow treats the model as an opaque, fallible `prompt -> text`
//! function; latency and retry behavior belong to the adapter.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with the model.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one request and return the model's text answer.
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

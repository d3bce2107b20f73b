//! Shared utilities for use cases.
//!
//! Cancellation checks and the timed, logged model invocation every stage
//! goes through.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Returns `true` if the token exists and is cancelled.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Resolves when the token is cancelled; never resolves without a token.
pub(crate) async fn cancelled(token: &Option<CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// A model answer with the wall-clock time it took.
pub(crate) struct TimedResponse {
    pub text: String,
    pub elapsed: f64,
}

/// Invoke the model once, applying the optional timeout and recording the
/// request/response pair to the conversation log.
pub(crate) async fn invoke_model<G: LlmGateway + ?Sized>(
    gateway: &G,
    logger: &dyn ConversationLogger,
    stage: &str,
    prompt: &str,
    timeout: Option<Duration>,
) -> Result<TimedResponse, GatewayError> {
    logger.log(ConversationEvent::new(
        "llm_request",
        serde_json::json!({
            "stage": stage,
            "model": gateway.model_name(),
            "bytes": prompt.len(),
            "prompt": prompt,
        }),
    ));

    let start = Instant::now();
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, gateway.invoke(prompt))
            .await
            .unwrap_or(Err(GatewayError::Timeout)),
        None => gateway.invoke(prompt).await,
    };
    let elapsed = start.elapsed().as_secs_f64();

    match &result {
        Ok(text) => {
            debug!("{} answered in {:.2}s ({} bytes)", stage, elapsed, text.len());
            logger.log(ConversationEvent::new(
                "llm_response",
                serde_json::json!({
                    "stage": stage,
                    "model": gateway.model_name(),
                    "elapsed_secs": elapsed,
                    "bytes": text.len(),
                    "text": text,
                }),
            ));
        }
        Err(e) => {
            logger.log(ConversationEvent::new(
                "llm_error",
                serde_json::json!({
                    "stage": stage,
                    "model": gateway.model_name(),
                    "elapsed_secs": elapsed,
                    "error": e.to_string(),
                }),
            ));
        }
    }

    result.map(|text| TimedResponse { text, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cancelled() {
        assert!(!is_cancelled(&None));
        let token = CancellationToken::new();
        let wrapped = Some(token.clone());
        assert!(!is_cancelled(&wrapped));
        token.cancel();
        assert!(is_cancelled(&wrapped));
    }
}

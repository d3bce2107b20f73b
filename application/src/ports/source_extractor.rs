//! Source extraction port
//!
//! Per-source extraction is an independent function of
//! `(product_name, source, raw_text)`; the orchestrator only consumes the
//! status, timing and text it hands back.

use crate::ports::llm_gateway::GatewayError;
use async_trait::async_trait;
use thiserror::Error;
use triangulation_domain::{SourceExtraction, SourceKey};

/// Failure of one source's extraction.
///
/// Always recovered locally: the source is marked `failed` and the run
/// continues with the others.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceExtractionError {
    #[error("Source {0} contains no data rows")]
    EmptySource(SourceKey),

    #[error("Model call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Extraction failed: {0}")]
    Other(String),
}

/// Extracts a specification table from one source's raw text.
#[async_trait]
pub trait SourceExtractor: Send + Sync {
    async fn extract(
        &self,
        product_name: &str,
        key: SourceKey,
        raw_text: &str,
    ) -> Result<SourceExtraction, SourceExtractionError>;
}

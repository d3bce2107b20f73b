//! Structured outcome of one source's extraction.

use super::key::{SourceKey, SourceType};
use super::status::SourceStatus;
use crate::core::error::DomainError;
use crate::spec::SpecRow;
use serde::{Deserialize, Serialize};

/// What a successful extraction hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceExtraction {
    /// Number of data rows in the raw upload
    pub raw_row_count: usize,
    /// Raw model output
    pub extracted_text: String,
    /// Rows parsed from `extracted_text`
    pub parsed_rows: Vec<SpecRow>,
    /// Wall-clock seconds spent on the model call
    pub processing_time: f64,
}

/// Outcome of one source's extraction within a run.
///
/// Created at upload time (`idle`) or as `not_uploaded`. Only the stage
/// that processes the source moves it forward; once `completed` or
/// `failed` it refuses further transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub key: SourceKey,
    pub status: SourceStatus,
    pub source_type: SourceType,
    pub raw_row_count: usize,
    pub extracted_text: String,
    pub parsed_rows: Vec<SpecRow>,
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceResult {
    fn with_status(key: SourceKey, status: SourceStatus) -> Self {
        Self {
            key,
            status,
            source_type: key.source_type(),
            raw_row_count: 0,
            extracted_text: String::new(),
            parsed_rows: Vec::new(),
            processing_time: 0.0,
            error: None,
        }
    }

    /// Placeholder for a source the caller did not supply.
    pub fn not_uploaded(key: SourceKey) -> Self {
        Self::with_status(key, SourceStatus::NotUploaded)
    }

    /// Fresh result for an uploaded source.
    pub fn idle(key: SourceKey) -> Self {
        Self::with_status(key, SourceStatus::Idle)
    }

    /// Fresh result for `key` depending on whether it was uploaded.
    pub fn initial(key: SourceKey, uploaded: bool) -> Self {
        if uploaded {
            Self::idle(key)
        } else {
            Self::not_uploaded(key)
        }
    }

    /// `idle → processing`
    pub fn begin_processing(&mut self) -> Result<(), DomainError> {
        self.transition(SourceStatus::Idle, SourceStatus::Processing)
    }

    /// `processing → completed`, recording the extraction.
    pub fn complete(&mut self, extraction: SourceExtraction) -> Result<(), DomainError> {
        self.transition(SourceStatus::Processing, SourceStatus::Completed)?;
        self.raw_row_count = extraction.raw_row_count;
        self.extracted_text = extraction.extracted_text;
        self.parsed_rows = extraction.parsed_rows;
        self.processing_time = extraction.processing_time;
        Ok(())
    }

    /// `processing → failed`, recording the error message.
    pub fn fail(&mut self, error: impl Into<String>, processing_time: f64) -> Result<(), DomainError> {
        self.transition(SourceStatus::Processing, SourceStatus::Failed)?;
        self.error = Some(error.into());
        self.processing_time = processing_time;
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    fn transition(&mut self, from: SourceStatus, to: SourceStatus) -> Result<(), DomainError> {
        if self.status != from {
            return Err(DomainError::InvalidTransition {
                source_key: self.key.to_string(),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction() -> SourceExtraction {
        SourceExtraction {
            raw_row_count: 42,
            extracted_text: "| Material | Steel, Aluminium | Durability | ✅ Yes |".to_string(),
            parsed_rows: vec![SpecRow::new(1, "Material", "Steel, Aluminium", "Durability", "✅ Yes")],
            processing_time: 1.5,
        }
    }

    #[test]
    fn test_initial_status_follows_upload() {
        assert_eq!(
            SourceResult::initial(SourceKey::PnsCalls, true).status,
            SourceStatus::Idle
        );
        assert_eq!(
            SourceResult::initial(SourceKey::PnsCalls, false).status,
            SourceStatus::NotUploaded
        );
        assert_eq!(
            SourceResult::idle(SourceKey::PnsCalls).source_type,
            SourceType::CallTranscripts
        );
    }

    #[test]
    fn test_happy_path() {
        let mut result = SourceResult::idle(SourceKey::SearchKeywords);
        result.begin_processing().unwrap();
        assert_eq!(result.status, SourceStatus::Processing);
        result.complete(extraction()).unwrap();
        assert!(result.is_completed());
        assert_eq!(result.raw_row_count, 42);
        assert_eq!(result.parsed_rows.len(), 1);
    }

    #[test]
    fn test_failure_records_error() {
        let mut result = SourceResult::idle(SourceKey::LmsChats);
        result.begin_processing().unwrap();
        result.fail("model unavailable", 0.25).unwrap();
        assert_eq!(result.status, SourceStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("model unavailable"));
    }

    #[test]
    fn test_terminal_results_are_frozen() {
        let mut result = SourceResult::idle(SourceKey::LmsChats);
        result.begin_processing().unwrap();
        result.complete(extraction()).unwrap();

        assert!(result.begin_processing().is_err());
        assert!(result.fail("late", 0.0).is_err());
        assert!(result.complete(extraction()).is_err());
        assert!(result.is_completed());
    }

    #[test]
    fn test_not_uploaded_cannot_start() {
        let mut result = SourceResult::not_uploaded(SourceKey::WhatsappSpecs);
        let err = result.begin_processing().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }
}

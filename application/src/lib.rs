//! Application layer for spec-triangulation
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::WorkflowParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, ProgressNotifier},
    source_extractor::{SourceExtractionError, SourceExtractor},
};
pub use use_cases::extract_source::ExtractSourceUseCase;
pub use use_cases::log_channel::{LogChannel, LogEntry, LogSender};
pub use use_cases::meta_ensemble::{EnsembleOutput, MetaEnsembleStage};
pub use use_cases::run_workflow::{
    RunWorkflowError, RunWorkflowInput, RunWorkflowUseCase, WorkflowOutcome,
};
pub use use_cases::stage::StageError;
pub use use_cases::triangulate::TriangulationStage;

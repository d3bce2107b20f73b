//! Infrastructure layer for spec-triangulation
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openai;
pub mod sources;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileWorkflowConfig,
};
pub use logging::JsonlConversationLogger;
pub use openai::{
    error::{OpenAiError, Result},
    gateway::OpenAiGateway,
};
pub use sources::{SourceFileLoader, SourceLoadError};

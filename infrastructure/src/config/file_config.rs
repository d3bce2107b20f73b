//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//!
//! ```toml
//! [llm]
//! model = "gpt-4.1-mini"
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! temperature = 0.1
//! timeout_seconds = 120
//!
//! [workflow]
//! parallel_sources = false
//! min_successful_runs = 1
//!
//! [output]
//! format = "table"
//! color = true
//!
//! [logging]
//! conversation_log = "logs/conversation.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use triangulation_application::WorkflowParams;
use triangulation_domain::RUN_COUNT;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("llm.model cannot be empty")]
    EmptyModelName,

    #[error("llm.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("llm.temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),

    #[error("workflow.min_successful_runs must be between 1 and {max}, got {value}")]
    InvalidMinSuccessfulRuns { value: usize, max: usize },
}

/// Model endpoint configuration (`[llm]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key; prefer `api_key_env`
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Per-call timeout; unset means no timeout
    pub timeout_seconds: Option<u64>,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            temperature: 0.1,
            max_tokens: None,
            timeout_seconds: None,
        }
    }
}

impl FileLlmConfig {
    /// Resolve the API key: explicit value first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Orchestrator settings (`[workflow]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    /// Extract a run's sources concurrently
    pub parallel_sources: bool,
    /// Successful runs required before the meta-ensemble
    pub min_successful_runs: usize,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        Self {
            parallel_sources: false,
            min_successful_runs: 1,
        }
    }
}

/// Output format selectable from the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    Table,
    Json,
    Summary,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<FileOutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Logging configuration (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every model call; disabled when unset
    pub conversation_log: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub llm: FileLlmConfig,
    pub workflow: FileWorkflowConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.llm.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(
                self.llm.temperature,
            ));
        }
        if !(1..=RUN_COUNT).contains(&self.workflow.min_successful_runs) {
            return Err(ConfigValidationError::InvalidMinSuccessfulRuns {
                value: self.workflow.min_successful_runs,
                max: RUN_COUNT,
            });
        }
        Ok(())
    }

    /// Convert to orchestrator parameters.
    pub fn to_workflow_params(&self) -> WorkflowParams {
        WorkflowParams::default()
            .with_parallel_sources(self.workflow.parallel_sources)
            .with_min_successful_runs(self.workflow.min_successful_runs)
            .with_model_timeout(self.llm.timeout())
    }
}

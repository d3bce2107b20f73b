//! Configuration file loading for spec-triangulation
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TRIANGULATION_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./triangulation.toml` or `./.triangulation.toml`
//! 4. Global: `$XDG_CONFIG_HOME/spec-triangulation/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig, FileOutputConfig,
    FileOutputFormat, FileWorkflowConfig,
};
pub use loader::ConfigLoader;

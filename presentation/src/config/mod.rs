//! Presentation-level configuration
//!
//! Configuration for output formatting.

use crate::cli::commands::OutputFormat;
use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(skip)]
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// The format to render with; tables unless told otherwise.
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Table)
    }

    /// Apply the color preference process-wide.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_table() {
        assert_eq!(OutputConfig::default().format(), OutputFormat::Table);
        let config = OutputConfig {
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        assert_eq!(config.format(), OutputFormat::Json);
    }
}

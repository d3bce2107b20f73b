//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use triangulation_domain::SourceKey;

/// Output format for workflow results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Final consensus, every run and the summary
    Table,
    /// Only the final consensus table and summary counts
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for spec-triangulation
#[derive(Parser, Debug)]
#[command(name = "spec-triangulation")]
#[command(author, version, about = "Triangulate buyer-decision specifications across data sources")]
#[command(long_about = r#"
Spec Triangulation extracts the specifications buyers care about from up to
five raw data exports and reconciles them into one ranked table.

The process has three runs and a final consensus:
1. Extraction: each uploaded source is summarised into a spec table
2. Triangulation: one table per run across all completed sources
3. Meta-ensemble: the three run tables are merged by cross-run confidence

Configuration files are loaded from (in priority order):
1. TRIANGULATION_* environment variables
2. --config <path>          Explicit config file
3. ./triangulation.toml     Project-level config
4. ~/.config/spec-triangulation/config.toml   Global config

Example:
  spec-triangulation -p "Diesel Generator" --search-keywords keywords.csv --lms-chats chats.csv
  spec-triangulation -p "Kettle" --pns-calls calls.txt -o json > result.json
"#)]
pub struct Cli {
    /// Product or category name
    #[arg(short, long)]
    pub product: Option<String>,

    /// Internal search keyword export
    #[arg(long, value_name = "PATH")]
    pub search_keywords: Option<PathBuf>,

    /// WhatsApp conversation export
    #[arg(long, value_name = "PATH")]
    pub whatsapp_specs: Option<PathBuf>,

    /// PNS call transcripts
    #[arg(long, value_name = "PATH")]
    pub pns_calls: Option<PathBuf>,

    /// BLNI comments / QRF rejection data
    #[arg(long, value_name = "PATH")]
    pub rejection_comments: Option<PathBuf>,

    /// LMS chat logs
    #[arg(long, value_name = "PATH")]
    pub lms_chats: Option<PathBuf>,

    /// Output format (overrides output.format from config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Extract sources of a run concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Successful runs required before the meta-ensemble (1-3)
    #[arg(long, value_name = "N")]
    pub min_successful_runs: Option<usize>,

    /// Model to use (overrides llm.model from config)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Write a JSONL transcript of every model call
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Also write diagnostic logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Source file paths given on the command line, keyed by source.
    pub fn source_paths(&self) -> BTreeMap<SourceKey, PathBuf> {
        [
            (SourceKey::SearchKeywords, &self.search_keywords),
            (SourceKey::WhatsappSpecs, &self.whatsapp_specs),
            (SourceKey::PnsCalls, &self.pns_calls),
            (SourceKey::RejectionComments, &self.rejection_comments),
            (SourceKey::LmsChats, &self.lms_chats),
        ]
        .into_iter()
        .filter_map(|(key, path)| path.clone().map(|p| (key, p)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_source_paths() {
        let cli = Cli::parse_from([
            "spec-triangulation",
            "-p",
            "Diesel Generator",
            "--search-keywords",
            "kw.csv",
            "--lms-chats",
            "chats.csv",
            "-o",
            "json",
        ]);

        let paths = cli.source_paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[&SourceKey::SearchKeywords], PathBuf::from("kw.csv"));
        assert_eq!(paths[&SourceKey::LmsChats], PathBuf::from("chats.csv"));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.product.as_deref(), Some("Diesel Generator"));
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["spec-triangulation", "-vv", "--show-config"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.show_config);
        assert!(cli.source_paths().is_empty());
    }
}

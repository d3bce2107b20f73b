//! CLI entrypoint for Spec Triangulation
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use triangulation_application::{
    ConversationLogger, ExtractSourceUseCase, NoConversationLogger, NoProgress, ProgressNotifier,
    RunWorkflowInput, RunWorkflowUseCase,
};
use triangulation_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, JsonlConversationLogger, OpenAiGateway,
    SourceFileLoader,
};
use triangulation_presentation::{
    Cli, ConsoleFormatter, OutputConfig, OutputFormat, ProgressReporter, SimpleProgress,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;

    let product = match cli.product.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => bail!("Product name is required (--product <NAME>)"),
    };

    let paths = cli.source_paths();
    if paths.is_empty() {
        bail!("At least one source file is required (e.g. --search-keywords <PATH>)");
    }

    info!("Starting Spec Triangulation for '{}'", product);

    let sources = SourceFileLoader::new()
        .allow_empty(true)
        .load(&paths)
        .await?;

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiGateway::from_config(&config.llm)?);
    let logger = conversation_logger(&config, &product);
    let params = config.to_workflow_params();

    let extractor = Arc::new(
        ExtractSourceUseCase::new(Arc::clone(&gateway))
            .with_conversation_logger(Arc::clone(&logger))
            .with_timeout(params.model_timeout),
    );

    let token = CancellationToken::new();
    spawn_interrupt_handler(token.clone());

    let use_case = RunWorkflowUseCase::new(gateway, extractor)
        .with_params(params)
        .with_conversation_logger(logger)
        .with_cancellation(token);

    let output = OutputConfig {
        format: cli.output.or(config.output.format.map(output_format)),
        color: config.output.color,
        show_progress: !cli.quiet,
    };
    output.apply_color();
    let format = output.format();

    let progress: Box<dyn ProgressNotifier> = if !output.show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let input = RunWorkflowInput::new(product, sources);
    let outcome = use_case
        .execute_with_progress(input, progress.as_ref())
        .await?;

    let rendered = match format {
        OutputFormat::Table => ConsoleFormatter::format(&outcome.state),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&outcome.state),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome.state),
    };
    println!("{}", rendered);

    match outcome.error {
        Some(e) => Err(anyhow!(e).context("Triangulation did not complete")),
        None => Ok(()),
    }
}

/// Console logging by verbosity, plus a daily file when `--log-dir` is set.
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "spec-triangulation.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

/// Merge config sources, apply CLI overrides, validate.
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("{}", e))
            .context("Failed to load configuration")?
    };

    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if cli.parallel {
        config.workflow.parallel_sources = true;
    }
    if let Some(min) = cli.min_successful_runs {
        config.workflow.min_successful_runs = min;
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}

fn conversation_logger(config: &FileConfig, product: &str) -> Arc<dyn ConversationLogger> {
    let Some(path) = &config.logging.conversation_log else {
        return Arc::new(NoConversationLogger);
    };
    match JsonlConversationLogger::open(path, product) {
        Ok(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        Err(e) => {
            warn!(
                "Could not open conversation log {}: {}; continuing without it",
                path.display(),
                e
            );
            Arc::new(NoConversationLogger)
        }
    }
}

/// Ctrl-C cancels the workflow; it then returns the last committed state.
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the last committed step");
            token.cancel();
        }
    });
}

fn output_format(format: FileOutputFormat) -> OutputFormat {
    match format {
        FileOutputFormat::Table => OutputFormat::Table,
        FileOutputFormat::Json => OutputFormat::Json,
        FileOutputFormat::Summary => OutputFormat::Summary,
    }
}

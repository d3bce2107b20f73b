//! Progress reporting for workflow execution

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use triangulation_application::ProgressNotifier;
use triangulation_domain::{RunRecord, SourceKey, SourceStatus, WorkflowStep};

/// Reports progress with an overall percentage bar plus one bar per run
pub struct ProgressReporter {
    multi: MultiProgress,
    overall: ProgressBar,
    run_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(100));
        overall.set_style(Self::overall_style());
        overall.set_prefix("Workflow");
        Self {
            multi,
            overall,
            run_bar: Mutex::new(None),
        }
    }

    fn overall_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn run_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold} [{bar:30.green/white}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn status_marker(status: SourceStatus) -> colored::ColoredString {
        match status {
            SourceStatus::Completed => "v".green(),
            SourceStatus::Failed => "x".red(),
            _ => "~".yellow(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_run_start(&self, run: u8, total_sources: usize) {
        let pb = self.multi.add(ProgressBar::new(total_sources as u64));
        pb.set_style(Self::run_style());
        pb.set_prefix(format!("Run {}", run));
        pb.set_message("extracting...");

        if let Ok(mut slot) = self.run_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_source_status(&self, _run: u8, key: SourceKey, status: SourceStatus) {
        let Ok(slot) = self.run_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.as_ref() {
            pb.set_message(format!(
                "{} {}",
                Self::status_marker(status),
                key.display_name()
            ));
            if status.is_terminal() {
                pb.inc(1);
            }
        }
    }

    fn on_run_complete(&self, record: &RunRecord) {
        let Ok(mut slot) = self.run_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            let message = if record.succeeded {
                format!("{} triangulated", "done".green())
            } else {
                format!("{}", "failed".red())
            };
            pb.finish_with_message(message);
        }
    }

    fn on_step(&self, step: WorkflowStep) {
        self.overall.set_message(step.to_string());
        if step.is_terminal() {
            self.overall.finish();
        }
    }

    fn on_progress(&self, percent: u8) {
        self.overall.set_position(percent as u64);
    }
}

/// Simple line-based progress on stderr, for non-interactive terminals
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_run_start(&self, run: u8, total_sources: usize) {
        eprintln!(
            "{} {} ({} sources)",
            "->".cyan(),
            format!("Run {}", run).bold(),
            total_sources
        );
    }

    fn on_source_status(&self, _run: u8, key: SourceKey, status: SourceStatus) {
        if status.is_terminal() {
            eprintln!(
                "  {} {} ({})",
                ProgressReporter::status_marker(status),
                key.display_name(),
                status
            );
        }
    }

    fn on_run_complete(&self, record: &RunRecord) {
        if record.succeeded {
            eprintln!("  {} run {} triangulated\n", "v".green(), record.run_number);
        } else {
            eprintln!("  {} run {} failed\n", "x".red(), record.run_number);
        }
    }

    fn on_step(&self, step: WorkflowStep) {
        if matches!(step, WorkflowStep::MetaEnsemble) {
            eprintln!("{} {}", "->".cyan(), "Meta-ensemble".bold());
        }
    }
}

//! Console output formatter for workflow results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use triangulation_domain::{
    ConsensusTally, PricingImpact, RunRecord, SourceStatus, SpecRow, TABLE_COLUMNS, WorkflowState,
    truncate,
};

/// Widest a cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 48;

/// Formats workflow results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(state: &WorkflowState) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Specification Triangulation Results"));
        output.push('\n');
        output.push_str(&Self::overview(state));

        output.push_str(&Self::section_header("Final Consensus"));
        output.push_str(&Self::final_table(state));

        for record in state.run_records() {
            output.push_str(&Self::section_header(&format!("Run {}", record.run_number)));
            output.push_str(&Self::run(record));
        }

        output.push_str(&Self::section_header("Summary"));
        output.push_str(&Self::summary(state));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON: the summary plus the full state
    pub fn format_json(state: &WorkflowState) -> String {
        let value = serde_json::json!({
            "summary": state.summary(),
            "state": state,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final consensus only (concise output)
    pub fn format_summary(state: &WorkflowState) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n\n",
            "=== Consensus Specifications ===".cyan().bold()
        ));
        output.push_str(&Self::overview(state));
        output.push_str(&Self::final_table(state));
        output.push('\n');
        output.push_str(&Self::summary(state));
        output
    }

    fn overview(state: &WorkflowState) -> String {
        let sources: Vec<&str> = state
            .uploaded_sources()
            .iter()
            .map(|k| k.display_name())
            .collect();
        format!(
            "{} {}\n{} {}\n{} {}\n\n",
            "Product:".cyan().bold(),
            state.product_name(),
            "Sources:".cyan().bold(),
            sources.join(", "),
            "Status:".cyan().bold(),
            state.current_step()
        )
    }

    fn final_table(state: &WorkflowState) -> String {
        if state.final_rows().is_empty() {
            return format!("{}\n", "No consensus table was produced.".yellow());
        }
        let tally = ConsensusTally::from_runs(state.run_records());
        Self::table(state.final_rows(), Some(&tally))
    }

    fn run(record: &RunRecord) -> String {
        let mut output = String::new();
        let status = if record.succeeded {
            "succeeded".green().bold()
        } else {
            "failed".red().bold()
        };
        output.push_str(&format!("Status: {}\n", status));

        for result in record.per_source_results.values() {
            let marker = match result.status {
                SourceStatus::Completed => "v".green(),
                SourceStatus::Failed => "x".red(),
                SourceStatus::NotUploaded => continue,
                _ => "-".dimmed(),
            };
            let detail = match &result.error {
                Some(error) => error.clone(),
                None => format!(
                    "{} row(s), {} spec(s), {:.2}s",
                    result.raw_row_count,
                    result.parsed_rows.len(),
                    result.processing_time
                ),
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                marker,
                result.key.display_name(),
                detail.dimmed()
            ));
        }
        output.push('\n');

        if record.succeeded {
            output.push_str(&Self::table(&record.triangulated_rows, None));
        }
        output
    }

    fn summary(state: &WorkflowState) -> String {
        let summary = state.summary();
        format!(
            "Runs: {}/{} successful | Consensus specs: {} | Datasets: {}\n",
            summary.successful_runs,
            summary.total_runs,
            summary.final_consensus_specs,
            summary.total_datasets_processed
        )
    }

    /// Render rows as an aligned text table, with a confidence column when
    /// a tally is given.
    pub fn table(rows: &[SpecRow], tally: Option<&ConsensusTally>) -> String {
        let mut headers: Vec<String> = TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
        if tally.is_some() {
            headers.push("Confidence".to_string());
        }

        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row
                    .cells()
                    .into_iter()
                    .map(|c| truncate(&c, MAX_CELL_WIDTH))
                    .collect();
                if let Some(tally) = tally {
                    cells.push(
                        tally
                            .tier(&row.specification)
                            .map(|t| format!("{} ({}%)", t, t.weight()))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }
                cells
            })
            .collect();

        let widths: Vec<usize> = (0..headers.len())
            .map(|i| {
                body.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        output.push_str(&Self::line(&headers, &widths).bold().to_string());
        output.push('\n');
        output.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        output.push('\n');
        for (row, cells) in rows.iter().zip(&body) {
            let line = Self::line(cells, &widths);
            // Rows the model could not classify are dimmed.
            let line = if row.pricing_impact() == PricingImpact::Unknown {
                line.dimmed()
            } else {
                line.normal()
            };
            output.push_str(&line.to_string());
            output.push('\n');
        }
        output
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, state: &WorkflowState) -> String {
        Self::format(state)
    }

    fn format_json(&self, state: &WorkflowState) -> String {
        Self::format_json(state)
    }

    fn format_summary(&self, state: &WorkflowState) -> String {
        Self::format_summary(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use triangulation_domain::{ParseProfile, SourceKey, StatePatch, TableParser};

    const TABLE: &str = "\
| Power Rating | 5 KVA, 7.5 KVA | Sizing | ✅ Yes |
| Fuel Type | Diesel, Petrol | Running cost | ❌ No |";

    fn completed_state() -> WorkflowState {
        let rows = TableParser::parse(TABLE, &ParseProfile::triangulation());
        let mut state = WorkflowState::new(
            "Diesel Generator",
            BTreeSet::from([SourceKey::SearchKeywords]),
        )
        .unwrap();
        for run in 1..=3u8 {
            let record = RunRecord::succeeded(
                run,
                TABLE,
                rows.clone(),
                WorkflowState::fresh_sources(state.uploaded_sources()),
            );
            state = state
                .merge(StatePatch::new().with_run_record(record))
                .unwrap();
        }
        state
            .merge(StatePatch::new().with_final_result(TABLE, rows))
            .unwrap()
    }

    #[test]
    fn test_table_aligns_and_adds_confidence() {
        colored::control::set_override(false);
        let state = completed_state();
        let tally = ConsensusTally::from_runs(state.run_records());

        let table = ConsoleFormatter::table(state.final_rows(), Some(&tally));
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("Rank | Specification"));
        assert!(lines[0].ends_with("Confidence"));
        assert!(lines[2].contains("Power Rating"));
        assert!(lines[2].contains("High (100%)"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_format_includes_runs_and_summary() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&completed_state());

        assert!(output.contains("Product: Diesel Generator"));
        assert!(output.contains("Run 3"));
        assert!(output.contains("Runs: 3/3 successful | Consensus specs: 2 | Datasets: 1"));
    }

    #[test]
    fn test_format_json_has_summary() {
        let json = ConsoleFormatter::format_json(&completed_state());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["successful_runs"], 3);
        assert_eq!(value["state"]["product_name"], "Diesel Generator");
        assert_eq!(value["state"]["final_rows"][0]["Specification"], "Power Rating");
    }

    #[test]
    fn test_summary_without_consensus() {
        colored::control::set_override(false);
        let state = WorkflowState::new(
            "Kettle",
            BTreeSet::from([SourceKey::LmsChats]),
        )
        .unwrap();

        let output = ConsoleFormatter::format_summary(&state);
        assert!(output.contains("No consensus table was produced."));
    }
}

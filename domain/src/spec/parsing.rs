//! Table parsing for free-form model output.
//!
//! Models are asked to answer with a pipe-delimited table:
//!
//! ```text
//! | Specification Name | Top Options (based on data) | Why it matters in the market | Impacts Pricing? |
//! |--------------------|-----------------------------|------------------------------|------------------|
//! | Power Rating       | 5 KVA, 7.5 KVA, 10 KVA      | Primary selection criteria   | ✅ Yes           |
//! ```
//!
//! What comes back is rarely that clean: prose around the table, missing
//! outer pipes, short rows. [`TableParser::parse`] keeps whatever rows it can
//! and degrades to a single labelled sentinel row when it finds none, so a
//! bad answer is visible in the output instead of aborting the pipeline.

use super::row::SpecRow;

/// Literal marker identifying the header line.
const HEADER_MARKER: &str = "Specification Name";

/// Minimum number of `|` characters on a data line.
const MIN_PIPES: usize = 3;

/// Minimum number of cells on a data row.
const MIN_FIELDS: usize = 4;

/// Stage-specific parsing knobs: boilerplate to strip and the sentinel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProfile {
    /// Removed from the Top Options cell (e.g. "(based on data)")
    pub option_suffix: String,
    /// Removed from the rationale cell (e.g. "in the market")
    pub rationale_suffix: String,
    /// Specification label of the sentinel row
    pub sentinel_label: String,
    /// Top Options text of the sentinel row
    pub sentinel_message: String,
}

impl ParseProfile {
    pub fn new(option_suffix: impl Into<String>, rationale_suffix: impl Into<String>) -> Self {
        Self {
            option_suffix: option_suffix.into(),
            rationale_suffix: rationale_suffix.into(),
            sentinel_label: "Parse Error".to_string(),
            sentinel_message: "Could not parse result".to_string(),
        }
    }

    /// Per-run profile used for source extraction and triangulation.
    pub fn triangulation() -> Self {
        Self::new("(based on data)", "in the market")
    }

    /// Cross-run profile used by the meta-ensemble.
    pub fn ensemble() -> Self {
        Self::new("(consensus across runs)", "in the market")
            .with_sentinel("Ensemble Parse Error", "Could not parse ensemble result")
    }

    pub fn with_sentinel(mut self, label: impl Into<String>, message: impl Into<String>) -> Self {
        self.sentinel_label = label.into();
        self.sentinel_message = message.into();
        self
    }

    /// The fixed diagnostic row returned when nothing could be parsed.
    pub fn sentinel_row(&self) -> SpecRow {
        SpecRow::new(
            1,
            self.sentinel_label.clone(),
            self.sentinel_message.clone(),
            "Error in parsing",
            "Unknown",
        )
    }

    /// Whether `rows` is exactly this profile's sentinel.
    pub fn is_sentinel(&self, rows: &[SpecRow]) -> bool {
        matches!(rows, [row] if row.specification == self.sentinel_label)
    }
}

impl Default for ParseProfile {
    fn default() -> Self {
        Self::triangulation()
    }
}

/// Turns free-form text into ranked [`SpecRow`]s.
pub struct TableParser;

impl TableParser {
    /// Parse `text` into rows ranked `1..=n` in order of appearance.
    ///
    /// Total: never panics and never returns an empty vector. Input with no
    /// well-formed row (including empty or whitespace-only input) yields the
    /// profile's sentinel row.
    pub fn parse(text: &str, profile: &ParseProfile) -> Vec<SpecRow> {
        let rows = Self::parse_rows(text, profile);
        if rows.is_empty() {
            vec![profile.sentinel_row()]
        } else {
            rows
        }
    }

    /// Like [`parse`](Self::parse) but returns an empty vector instead of
    /// the sentinel row.
    pub fn parse_rows(text: &str, profile: &ParseProfile) -> Vec<SpecRow> {
        let mut rows = Vec::new();
        let mut rank = 1u32;

        for line in text.lines().map(str::trim) {
            if Self::is_non_data_line(line) {
                continue;
            }

            let fields = Self::split_cells(line);
            if fields.len() < MIN_FIELDS {
                continue;
            }

            rows.push(SpecRow::new(
                rank,
                fields[0],
                strip_boilerplate(fields[1], &profile.option_suffix),
                strip_boilerplate(fields[2], &profile.rationale_suffix),
                fields[3],
            ));
            rank = rank.saturating_add(1);
        }

        rows
    }

    fn is_non_data_line(line: &str) -> bool {
        line.is_empty()
            || line.contains(HEADER_MARKER)
            || line.starts_with("|-")
            || line.matches('|').count() < MIN_PIPES
            || is_alignment_row(line)
    }

    /// Strip one leading and one trailing pipe, split, trim.
    fn split_cells(line: &str) -> Vec<&str> {
        let inner = line.strip_prefix('|').unwrap_or(line);
        let inner = inner.strip_suffix('|').unwrap_or(inner);
        inner.split('|').map(str::trim).collect()
    }
}

/// `| :--- | ---: |` style separators written with inner spaces.
fn is_alignment_row(line: &str) -> bool {
    line.chars().any(|c| c == '-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn strip_boilerplate(cell: &str, boilerplate: &str) -> String {
    if boilerplate.is_empty() {
        return cell.to_string();
    }
    cell.replace(boilerplate, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
Here is the consolidated table:

| Specification Name | Top Options (based on data) | Why it matters in the market | Impacts Pricing? |
|--------------------|-----------------------------|------------------------------|------------------|
| Material | Aluminium, Steel, Stainless Steel (based on data) | Affects durability in the market | ✅ Yes |
| Power Rating | 5 KVA, 7.5 KVA, 10 KVA | Determines load capacity | ✅ Yes |
| Phase Configuration | Single Phase, Three Phase | Must match facility wiring | ❌ No |

These three drive most enquiries.
"#;

    #[test]
    fn test_parses_well_formed_table() {
        let rows = TableParser::parse(TABLE, &ParseProfile::triangulation());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].specification, "Material");
        assert_eq!(rows[0].top_options, "Aluminium, Steel, Stainless Steel");
        assert_eq!(rows[0].rationale, "Affects durability");
        assert_eq!(rows[2].impacts_pricing, "❌ No");
    }

    #[test]
    fn test_ranks_are_sequential() {
        let rows = TableParser::parse(TABLE, &ParseProfile::triangulation());
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_inputs_yield_sentinel() {
        let profile = ParseProfile::triangulation();
        for input in ["", "   \n\t\n", "not a table", "| only | two |"] {
            let rows = TableParser::parse(input, &profile);
            assert_eq!(rows.len(), 1, "input {input:?}");
            assert_eq!(rows[0].specification, "Parse Error");
            assert_eq!(rows[0].rank, 1);
            assert!(profile.is_sentinel(&rows));
        }
    }

    #[test]
    fn test_ensemble_sentinel_label() {
        let rows = TableParser::parse("no table here", &ParseProfile::ensemble());
        assert_eq!(rows[0].specification, "Ensemble Parse Error");
        assert_eq!(rows[0].top_options, "Could not parse ensemble result");
        assert_eq!(rows[0].impacts_pricing, "Unknown");
    }

    #[test]
    fn test_short_rows_are_skipped_without_breaking_ranks() {
        let text = "\
| Material | Steel, Iron | Durability | ✅ Yes |
| Broken | row | here |
| Capacity | 100 L, 200 L | Sizing | ✅ Yes |";
        let rows = TableParser::parse(text, &ParseProfile::triangulation());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].specification, "Capacity");
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn test_rows_without_outer_pipes() {
        let text = "Material | Steel, Iron | Durability | ✅ Yes";
        let rows = TableParser::parse(text, &ParseProfile::triangulation());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].specification, "Material");
        assert_eq!(rows[0].impacts_pricing, "✅ Yes");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let text = "| Material | Steel | Durability | ✅ Yes | extra | more |";
        let rows = TableParser::parse(text, &ParseProfile::triangulation());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].impacts_pricing, "✅ Yes");
    }

    #[test]
    fn test_spaced_alignment_rows_are_skipped() {
        let text = "\
| Spec | Options | Why | Pricing |
| :--- | --- | --- | ---: |
| Voltage | 220 V, 440 V | Grid match | ✅ Yes |";
        let rows = TableParser::parse(text, &ParseProfile::triangulation());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].specification, "Spec");
        assert_eq!(rows[1].specification, "Voltage");
    }

    #[test]
    fn test_ensemble_boilerplate_is_stripped() {
        let text = "| Power | 5 KVA, 10 KVA (consensus across runs) | Load sizing in the market | ✅ Yes |";
        let rows = TableParser::parse(text, &ParseProfile::ensemble());
        assert_eq!(rows[0].top_options, "5 KVA, 10 KVA");
        assert_eq!(rows[0].rationale, "Load sizing");
    }

    #[test]
    fn test_parse_rows_can_be_empty() {
        assert!(TableParser::parse_rows("", &ParseProfile::default()).is_empty());
    }

    #[test]
    fn test_parser_totality_on_odd_inputs() {
        let profile = ParseProfile::triangulation();
        let inputs = [
            "|",
            "||||",
            "|-|-|-|-|",
            "| ✅ | ❌ | 日本語 | 🚀 |",
            "\u{0}|\u{0}|\u{0}|\u{0}",
            "Specification Name | a | b | c",
        ];
        for input in inputs {
            let rows = TableParser::parse(input, &profile);
            assert!(!rows.is_empty(), "input {input:?}");
        }
    }
}

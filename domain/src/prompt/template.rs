//! Prompt templates for the extraction, triangulation and ensemble stages

use crate::consensus::ConfidenceTier;
use crate::orchestration::RunRecord;
use crate::source::{SourceKey, SourceResult};
use std::collections::BTreeMap;

/// Header row every stage asks the model to reproduce.
fn table_header(option_heading: &str) -> String {
    format!(
        "| Specification Name | Top Options {} | Why it matters in the market | Impacts Pricing? |",
        option_heading
    )
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt shared by all stages
    pub fn system() -> &'static str {
        r#"You are a B2B market analyst. You identify the product specifications that drive buyer decisions.
Answer only with the requested markdown table. Do not repeat the input data."#
    }

    /// Per-source extraction request
    pub fn extraction_prompt(product_name: &str, key: SourceKey, raw_text: &str) -> String {
        let source_type = key.source_type();
        format!(
            r#"Product: {product}
Source: {name} ({kind}, rows weighted by {metric})

Identify the specifications buyers of {product} care about in the data below.
Merge semantically identical options. Every specification needs at least 2 distinct options.
Do not use the product name itself as a specification.

<data>
{data}
</data>

Reply with EXACTLY this table format, 3-8 rows:

{header}"#,
            product = product_name,
            name = key.display_name(),
            kind = source_type,
            metric = source_type.metric_name(),
            data = raw_text,
            header = table_header("(based on data)"),
        )
    }

    /// Single-run aggregation request over all completed sources
    pub fn triangulation_prompt(
        product_name: &str,
        completed: &BTreeMap<SourceKey, SourceResult>,
    ) -> String {
        let datasets: BTreeMap<&str, &str> = completed
            .iter()
            .map(|(key, result)| (key.as_str(), result.extracted_text.as_str()))
            .collect();
        let datasets_json =
            serde_json::to_string_pretty(&datasets).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"Analyze {count} independent extraction results to identify the most critical {product} specifications through cross-validation and consensus building.

Merge semantically identical specification names and options. No duplicate specification names.
INCLUDE specifications that appear in 2+ sources OR have very high frequency in 1 source, have at least 2 meaningful options, and directly influence {product} selection.
EXCLUDE generic descriptors ("Good Quality", "Best"), names duplicating the product name, brands, and location-specific attributes.

<datasets_to_analyze>
{datasets}
</datasets_to_analyze>

Create a table with EXACTLY this format:

{header}

Requirements:
1. Limit to 3-5 most impactful specifications
2. Top Options: 3-5 most frequent options from the data, comma-separated; do not invent options
3. Why it matters: concise business justification
4. Impacts Pricing: "✅ Yes" or "❌ No""#,
            count = completed.len(),
            product = product_name,
            datasets = datasets_json,
            header = table_header("(based on data)"),
        )
    }

    /// Cross-run consensus request over the three run tables
    pub fn ensemble_prompt(product_name: &str, records: &[RunRecord]) -> String {
        let mut runs = String::new();
        for record in records {
            runs.push_str(&format!(
                "\n=== RUN {} TRIANGULATION RESULT ===\n{}\n",
                record.run_number, record.triangulated_text
            ));
        }

        let mut tiers = String::new();
        for tier in ConfidenceTier::descending() {
            tiers.push_str(&format!(
                "- Appears in {}/{} runs: {} confidence (weight: {}%)\n",
                tier.appearances(),
                records.len(),
                tier,
                tier.weight()
            ));
        }

        format!(
            r#"Perform the final consensus over {count} independent specification extraction runs for {product}.
Runs marked "Run failed" produced no table; ignore them.

1. Identify specifications that appear in multiple runs and merge names with the same meaning.
2. Prefer options that appear across multiple runs.
3. Rank by consensus:
{tiers}
INCLUDE specifications that appear in at least 2 runs OR have very high confidence in 1 run.
EXCLUDE specifications with conflicting interpretations across runs.

<run_results>
{runs}
</run_results>

Create the final consensus table with EXACTLY this format:

{header}

Requirements:
1. Limit to 3-5 highest confidence specifications
2. Top Options: 3-5 options with highest consensus, comma-separated
3. Impacts Pricing: "✅ Yes" or "❌ No""#,
            count = records.len(),
            product = product_name,
            tiers = tiers,
            runs = runs,
            header = table_header("(consensus across runs)"),
        )
    }
}

//! Specification table rows.

use serde::{Deserialize, Serialize};

/// Column headers of the output table, stable across per-run and ensemble stages.
pub const TABLE_COLUMNS: [&str; 5] = [
    "Rank",
    "Specification",
    "Top Options",
    "Why it matters",
    "Impacts Pricing?",
];

/// One ranked specification entry.
///
/// Produced by [`TableParser`](super::TableParser); the only other place a
/// row is built by hand is the parser's own sentinel row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecRow {
    /// 1-based, sequential
    #[serde(rename = "Rank")]
    pub rank: u32,
    #[serde(rename = "Specification")]
    pub specification: String,
    /// Comma-joined options
    #[serde(rename = "Top Options")]
    pub top_options: String,
    #[serde(rename = "Why it matters")]
    pub rationale: String,
    /// Tri-state marker as written by the model (e.g. "✅ Yes")
    #[serde(rename = "Impacts Pricing?")]
    pub impacts_pricing: String,
}

impl SpecRow {
    pub(crate) fn new(
        rank: u32,
        specification: impl Into<String>,
        top_options: impl Into<String>,
        rationale: impl Into<String>,
        impacts_pricing: impl Into<String>,
    ) -> Self {
        Self {
            rank,
            specification: specification.into(),
            top_options: top_options.into(),
            rationale: rationale.into(),
            impacts_pricing: impacts_pricing.into(),
        }
    }

    /// Options split on commas, trimmed, empties dropped.
    pub fn options(&self) -> Vec<&str> {
        self.top_options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect()
    }

    pub fn pricing_impact(&self) -> PricingImpact {
        PricingImpact::classify(&self.impacts_pricing)
    }

    /// Cells in [`TABLE_COLUMNS`] order.
    pub fn cells(&self) -> [String; 5] {
        [
            self.rank.to_string(),
            self.specification.clone(),
            self.top_options.clone(),
            self.rationale.clone(),
            self.impacts_pricing.clone(),
        ]
    }
}

/// Interpretation of the "Impacts Pricing?" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingImpact {
    Yes,
    No,
    Unknown,
}

impl PricingImpact {
    /// Classify a free-form marker such as "✅ Yes", "❌ No" or "Unknown".
    pub fn classify(marker: &str) -> Self {
        if marker.contains('✅') {
            return PricingImpact::Yes;
        }
        if marker.contains('❌') {
            return PricingImpact::No;
        }

        let word = marker
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if word.starts_with("yes") {
            PricingImpact::Yes
        } else if word == "no" || word.starts_with("no ") || word.starts_with("no,") {
            PricingImpact::No
        } else {
            PricingImpact::Unknown
        }
    }
}

impl std::fmt::Display for PricingImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingImpact::Yes => write!(f, "Yes"),
            PricingImpact::No => write!(f, "No"),
            PricingImpact::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_markers() {
        assert_eq!(PricingImpact::classify("✅ Yes"), PricingImpact::Yes);
        assert_eq!(PricingImpact::classify("❌ No"), PricingImpact::No);
        assert_eq!(PricingImpact::classify("yes"), PricingImpact::Yes);
        assert_eq!(PricingImpact::classify("No"), PricingImpact::No);
        assert_eq!(PricingImpact::classify("Unknown"), PricingImpact::Unknown);
        assert_eq!(PricingImpact::classify("Not sure"), PricingImpact::Unknown);
        assert_eq!(PricingImpact::classify(""), PricingImpact::Unknown);
    }

    #[test]
    fn test_options_split() {
        let row = SpecRow::new(1, "Phase", "Single Phase, Three Phase, ", "Wiring", "✅ Yes");
        assert_eq!(row.options(), vec!["Single Phase", "Three Phase"]);
        assert_eq!(row.pricing_impact(), PricingImpact::Yes);
    }

    #[test]
    fn test_serializes_with_table_headers() {
        let row = SpecRow::new(2, "Material", "Steel", "Durability", "❌ No");
        let value = serde_json::to_value(&row).unwrap();
        for column in TABLE_COLUMNS {
            assert!(value.get(column).is_some(), "missing column {column}");
        }
        assert_eq!(value["Rank"], 2);
    }
}

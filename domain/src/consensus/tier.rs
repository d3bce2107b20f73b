//! Cross-run confidence tiers.

use crate::orchestration::{RUN_COUNT, RunRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence of a specification by how many runs surfaced it.
///
/// | Appearances | Tier | Weight |
/// |-------------|------|--------|
/// | 3/3 | High | 100% |
/// | 2/3 | Medium | 70% |
/// | 1/3 | Low | 30% |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Tier for a spec seen in `appearances` of [`RUN_COUNT`] runs.
    ///
    /// Returns `None` when the specification never appeared.
    pub fn from_appearances(appearances: usize) -> Option<Self> {
        match appearances {
            0 => None,
            1 => Some(ConfidenceTier::Low),
            2 => Some(ConfidenceTier::Medium),
            _ => Some(ConfidenceTier::High),
        }
    }

    /// Weight in percent.
    pub fn weight(&self) -> u8 {
        match self {
            ConfidenceTier::High => 100,
            ConfidenceTier::Medium => 70,
            ConfidenceTier::Low => 30,
        }
    }

    /// Appearance count this tier stands for.
    pub fn appearances(&self) -> usize {
        match self {
            ConfidenceTier::High => 3,
            ConfidenceTier::Medium => 2,
            ConfidenceTier::Low => 1,
        }
    }

    /// Tiers from highest to lowest.
    pub fn descending() -> [ConfidenceTier; 3] {
        [ConfidenceTier::High, ConfidenceTier::Medium, ConfidenceTier::Low]
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "High"),
            ConfidenceTier::Medium => write!(f, "Medium"),
            ConfidenceTier::Low => write!(f, "Low"),
        }
    }
}

/// How many successful runs named each specification.
///
/// Names are compared case-insensitively with surrounding whitespace and
/// markdown emphasis removed; semantic merging is left to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsensusTally {
    counts: BTreeMap<String, usize>,
}

impl ConsensusTally {
    pub fn from_runs(records: &[RunRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for record in records.iter().filter(|r| r.succeeded) {
            let mut seen = std::collections::BTreeSet::new();
            for row in &record.triangulated_rows {
                let name = normalize(&row.specification);
                if !name.is_empty() && seen.insert(name.clone()) {
                    *counts.entry(name).or_insert(0) += 1;
                }
            }
        }
        Self { counts }
    }

    /// Number of runs that named `specification`.
    pub fn appearances(&self, specification: &str) -> usize {
        self.counts
            .get(&normalize(specification))
            .copied()
            .unwrap_or(0)
            .min(RUN_COUNT)
    }

    pub fn tier(&self, specification: &str) -> Option<ConfidenceTier> {
        ConfidenceTier::from_appearances(self.appearances(specification))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ParseProfile, TableParser};
    use std::collections::BTreeMap;

    fn record(run: u8, text: &str) -> RunRecord {
        RunRecord::succeeded(
            run,
            text,
            TableParser::parse(text, &ParseProfile::triangulation()),
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_tier_weights() {
        assert_eq!(ConfidenceTier::from_appearances(3), Some(ConfidenceTier::High));
        assert_eq!(ConfidenceTier::from_appearances(2).map(|t| t.weight()), Some(70));
        assert_eq!(ConfidenceTier::from_appearances(1).map(|t| t.weight()), Some(30));
        assert_eq!(ConfidenceTier::from_appearances(0), None);
        assert!(ConfidenceTier::High > ConfidenceTier::Low);
    }

    #[test]
    fn test_tally_counts_runs_not_rows() {
        let records = vec![
            record(1, "| Material | Steel, Iron | x | ✅ Yes |\n| material | Steel | dup | ✅ Yes |"),
            record(2, "| **Material** | Steel | x | ✅ Yes |\n| Phase | Single, Three | y | ❌ No |"),
            RunRecord::failed(3, BTreeMap::new()),
        ];
        let tally = ConsensusTally::from_runs(&records);

        assert_eq!(tally.appearances("Material"), 2);
        assert_eq!(tally.tier("MATERIAL"), Some(ConfidenceTier::Medium));
        assert_eq!(tally.tier("Phase"), Some(ConfidenceTier::Low));
        assert_eq!(tally.tier("Voltage"), None);
    }
}

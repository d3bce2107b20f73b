//! Source status tracking: decides when a run is ready to aggregate.

use super::key::SourceKey;
use super::status::SourceStatus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a readiness check over one run's source statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// At least one uploaded source is still idle or processing
    Wait,
    /// Every uploaded source is terminal and at least one completed
    Triangulate,
    /// Every uploaded source is terminal and none completed
    AllFailed,
}

impl Readiness {
    pub fn is_wait(&self) -> bool {
        matches!(self, Readiness::Wait)
    }

    pub fn is_triangulate(&self) -> bool {
        matches!(self, Readiness::Triangulate)
    }

    pub fn is_all_failed(&self) -> bool {
        matches!(self, Readiness::AllFailed)
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::Wait => write!(f, "wait"),
            Readiness::Triangulate => write!(f, "triangulate"),
            Readiness::AllFailed => write!(f, "all_failed"),
        }
    }
}

/// Maps the fixed source keys to statuses and decides readiness.
///
/// Total: every status assignment yields exactly one [`Readiness`].
/// A key missing from the status map counts as `not_uploaded`.
pub struct SourceStatusTracker;

impl SourceStatusTracker {
    pub fn decide(
        uploaded: &BTreeSet<SourceKey>,
        statuses: &BTreeMap<SourceKey, SourceStatus>,
    ) -> Readiness {
        let status_of = |key: &SourceKey| statuses.get(key).copied().unwrap_or_default();

        let done: BTreeSet<SourceKey> = SourceKey::ALL
            .into_iter()
            .filter(|key| status_of(key).is_terminal())
            .collect();

        if !uploaded.is_subset(&done) {
            return Readiness::Wait;
        }

        if done.iter().any(|key| status_of(key).is_completed()) {
            Readiness::Triangulate
        } else {
            Readiness::AllFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(keys: &[SourceKey]) -> BTreeSet<SourceKey> {
        keys.iter().copied().collect()
    }

    #[test]
    fn test_wait_while_processing() {
        let up = uploaded(&[SourceKey::SearchKeywords, SourceKey::LmsChats]);
        let statuses = BTreeMap::from([
            (SourceKey::SearchKeywords, SourceStatus::Completed),
            (SourceKey::LmsChats, SourceStatus::Processing),
        ]);
        assert_eq!(SourceStatusTracker::decide(&up, &statuses), Readiness::Wait);
    }

    #[test]
    fn test_triangulate_with_partial_failure() {
        let up = uploaded(&[SourceKey::SearchKeywords, SourceKey::LmsChats]);
        let statuses = BTreeMap::from([
            (SourceKey::SearchKeywords, SourceStatus::Completed),
            (SourceKey::LmsChats, SourceStatus::Failed),
        ]);
        assert_eq!(
            SourceStatusTracker::decide(&up, &statuses),
            Readiness::Triangulate
        );
    }

    #[test]
    fn test_all_failed() {
        let up = uploaded(&[SourceKey::PnsCalls]);
        let statuses = BTreeMap::from([(SourceKey::PnsCalls, SourceStatus::Failed)]);
        assert_eq!(
            SourceStatusTracker::decide(&up, &statuses),
            Readiness::AllFailed
        );
    }

    #[test]
    fn test_missing_status_counts_as_not_terminal() {
        let up = uploaded(&[SourceKey::PnsCalls]);
        assert_eq!(
            SourceStatusTracker::decide(&up, &BTreeMap::new()),
            Readiness::Wait
        );
    }

    #[test]
    fn test_status_totality_over_all_assignments() {
        // 4^5 assignments of non-`not_uploaded` statuses over the five keys
        let candidates = [
            SourceStatus::Idle,
            SourceStatus::Processing,
            SourceStatus::Completed,
            SourceStatus::Failed,
        ];
        let up = uploaded(&[SourceKey::SearchKeywords, SourceKey::LmsChats]);
        let mut seen = 0;

        for mut code in 0..4usize.pow(5) {
            let mut statuses = BTreeMap::new();
            for key in SourceKey::ALL {
                statuses.insert(key, candidates[code % 4]);
                code /= 4;
            }

            let decision = SourceStatusTracker::decide(&up, &statuses);
            let some_uploaded_pending = up.iter().any(|k| !statuses[k].is_terminal());
            let any_completed = statuses.values().any(|s| s.is_completed());

            assert_eq!(decision.is_wait(), some_uploaded_pending);
            if !some_uploaded_pending {
                assert_eq!(decision.is_triangulate(), any_completed);
                assert_eq!(decision.is_all_failed(), !any_completed);
            }
            seen += 1;
        }

        assert_eq!(seen, 1024);
    }
}

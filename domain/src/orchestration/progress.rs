//! Progress accounting across the three-run protocol.

use super::run::RUN_COUNT;

/// Converts completed units of work into a percentage.
///
/// Each run is `uploaded + 1` units (one per source extraction, one for
/// triangulation); the meta-ensemble is the final unit. Everything short of
/// the ensemble caps at 99 so only [`ProgressModel::COMPLETE`] reads 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressModel {
    units_per_run: usize,
}

impl ProgressModel {
    pub const COMPLETE: u8 = 100;

    pub fn new(uploaded_count: usize) -> Self {
        Self {
            units_per_run: uploaded_count + 1,
        }
    }

    fn total_units(&self) -> usize {
        RUN_COUNT * self.units_per_run + 1
    }

    /// Percentage after `completed_runs` full runs plus `units_in_run`
    /// units of the current one.
    pub fn percent(&self, completed_runs: usize, units_in_run: usize) -> u8 {
        let done = completed_runs * self.units_per_run + units_in_run.min(self.units_per_run);
        let pct = done * 100 / self.total_units();
        pct.min(99) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let model = ProgressModel::new(2);
        let mut last = 0;
        for run in 0..RUN_COUNT {
            for unit in 0..=3 {
                let pct = model.percent(run, unit);
                assert!(pct >= last, "run {run} unit {unit}: {pct} < {last}");
                last = pct;
            }
        }
        assert!(last < ProgressModel::COMPLETE);
    }

    #[test]
    fn test_known_values() {
        // 2 sources → 3 units per run, 10 units total
        let model = ProgressModel::new(2);
        assert_eq!(model.percent(0, 0), 0);
        assert_eq!(model.percent(1, 0), 30);
        assert_eq!(model.percent(3, 0), 90);
    }
}

//! Reproduction-number estimators.
//!
//! The estimate is engine-defined: any implementation works as long as
//! it is deterministic given the day's counts and the prior history.

use crate::{grid::StateCounts, statistics::DayRecord, types::Day};

pub trait R0Estimator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Estimate R0 for `day` from today's counts and every earlier record.
    fn estimate(&self, day: Day, counts: &StateCounts, history: &[DayRecord]) -> f64;
}

/// Cumulative ratio: everyone ever infected divided by the seed cases.
/// Zero on day 0 and when the run started with no infected cells.
#[derive(Debug, Clone, Copy)]
pub struct CumulativeRatio {
    pub initial_infected: u64,
}

impl CumulativeRatio {
    pub fn new(initial_infected: u64) -> Self {
        Self { initial_infected }
    }
}

impl R0Estimator for CumulativeRatio {
    fn name(&self) -> &'static str { "cumulative_ratio" }

    fn estimate(&self, day: Day, counts: &StateCounts, _history: &[DayRecord]) -> f64 {
        if day == 0 || self.initial_infected == 0 {
            return 0.0;
        }
        counts.ever_infected() as f64 / self.initial_infected as f64
    }
}

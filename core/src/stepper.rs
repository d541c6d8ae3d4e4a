//! Day stepper trait and the sequential implementation.
//!
//! RULE: Every engine variant implements DayStepper.
//! The driver calls step() once per simulated day with the previous
//! day's grid and swaps in the returned grid.
//! A stepper never mutates the grid it is given.

use crate::{
    error::SimResult,
    grid::{Grid, StateCounts},
    model::EpidemicModel,
    timing::ExecutionTime,
    types::Day,
};

/// The contract every engine variant must fulfill.
pub trait DayStepper: Send {
    /// Stable name, written to the run manifest.
    fn name(&self) -> &'static str;

    /// Number of workers used per step.
    fn workers(&self) -> usize;

    /// Compute `day` from `previous` (which holds day - 1).
    ///
    /// Returns the new grid and its population counts.
    fn step(&mut self, previous: &Grid, day: Day) -> SimResult<(Grid, StateCounts)>;

    /// Timing record for a run of this stepper. Sequential runs omit
    /// the core count.
    fn execution_time(&self, seconds: f64) -> ExecutionTime {
        ExecutionTime::sequential(seconds)
    }
}

/// Single-threaded full sweep.
pub struct SequentialStepper {
    model: EpidemicModel,
}

impl SequentialStepper {
    pub fn new(model: EpidemicModel) -> Self {
        Self { model }
    }
}

impl DayStepper for SequentialStepper {
    fn name(&self) -> &'static str { "sequential" }

    fn workers(&self) -> usize { 1 }

    fn step(&mut self, previous: &Grid, day: Day) -> SimResult<(Grid, StateCounts)> {
        Ok(self.model.step(previous, day))
    }
}

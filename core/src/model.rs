//! Epidemic model: per-day transition rules over a grid.
//!
//! RULES:
//!   - A transition reads ONLY the previous day's states.
//!   - Susceptible with k infected Moore neighbours is infected
//!     with probability 1 - (1 - p_infection)^k.
//!   - Infected dies with p_death, otherwise recovers with p_recovery.
//!   - Recovered and Dead are absorbing.
//!   - Every draw for a cell comes from RngBank::for_cell(day, cell).

use crate::{
    config::ModelConfig,
    grid::{Bounds, CellState, Grid, StateCounts},
    rng::RngBank,
    types::Day,
};

/// Read access to the previous day's states, in global grid coordinates.
///
/// Implemented by the full grid (sequential sweep) and by halo blocks
/// (parallel sweep), so both paths run the exact same rule code.
pub trait CellView {
    fn state(&self, row: usize, col: usize) -> CellState;
    fn infected_neighbors(&self, row: usize, col: usize) -> u32;
}

impl CellView for Grid {
    fn state(&self, row: usize, col: usize) -> CellState {
        self.get(row, col)
    }

    fn infected_neighbors(&self, row: usize, col: usize) -> u32 {
        Grid::infected_neighbors(self, row, col)
    }
}

#[derive(Debug, Clone)]
pub struct EpidemicModel {
    rules:    ModelConfig,
    rng_bank: RngBank,
}

impl EpidemicModel {
    pub fn new(rules: ModelConfig, seed: u64) -> Self {
        Self { rules, rng_bank: RngBank::new(seed) }
    }

    /// Chance that a susceptible cell with `infected_neighbors` gets infected today.
    pub fn infection_chance(&self, infected_neighbors: u32) -> f64 {
        if infected_neighbors == 0 {
            return 0.0;
        }
        1.0 - (1.0 - self.rules.infection_prob).powi(infected_neighbors as i32)
    }

    /// State of one cell on `day`, given the view of `day - 1`.
    /// `grid_cols` is the width of the full grid, used to key the RNG.
    pub fn advance_cell<V: CellView>(
        &self,
        view: &V,
        day: Day,
        row: usize,
        col: usize,
        grid_cols: usize,
    ) -> CellState {
        match view.state(row, col) {
            CellState::Susceptible => {
                let k = view.infected_neighbors(row, col);
                if k == 0 {
                    return CellState::Susceptible;
                }
                let mut rng = self.rng_bank.for_cell(day, row * grid_cols + col);
                if rng.chance(self.infection_chance(k)) {
                    CellState::Infected
                } else {
                    CellState::Susceptible
                }
            }
            CellState::Infected => {
                let mut rng = self.rng_bank.for_cell(day, row * grid_cols + col);
                if rng.chance(self.rules.death_prob) {
                    CellState::Dead
                } else if rng.chance(self.rules.recovery_prob) {
                    CellState::Recovered
                } else {
                    CellState::Infected
                }
            }
            absorbing => absorbing,
        }
    }

    /// Compute every cell of `bounds` for `day`. Returns the row-major
    /// block and its partial counts.
    pub fn advance_region<V: CellView>(
        &self,
        view: &V,
        day: Day,
        bounds: Bounds,
        grid_cols: usize,
    ) -> (Vec<CellState>, StateCounts) {
        let mut block = Vec::with_capacity(bounds.rows() * bounds.cols());
        let mut counts = StateCounts::default();
        for row in bounds.row_start..bounds.row_end {
            for col in bounds.col_start..bounds.col_end {
                let next = self.advance_cell(view, day, row, col, grid_cols);
                counts.record(next);
                block.push(next);
            }
        }
        (block, counts)
    }

    /// Full sequential sweep: `grid` holds day - 1, the result holds `day`.
    pub fn step(&self, grid: &Grid, day: Day) -> (Grid, StateCounts) {
        let bounds = grid.bounds();
        let (block, counts) = self.advance_region(grid, day, bounds, grid.cols());
        let mut next = Grid::with_dimensions(grid.rows(), grid.cols());
        next.write_block(bounds, &block);
        (next, counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(infection: f64, recovery: f64, death: f64) -> ModelConfig {
        ModelConfig { infection_prob: infection, recovery_prob: recovery, death_prob: death }
    }

    #[test]
    fn infection_chance_compounds_per_neighbour() {
        let model = EpidemicModel::new(rules(0.3, 0.1, 0.01), 1);
        assert_eq!(model.infection_chance(0), 0.0);
        assert!((model.infection_chance(1) - 0.3).abs() < 1e-12);
        assert!((model.infection_chance(2) - 0.51).abs() < 1e-12);
    }

    #[test]
    fn certain_infection_spreads_to_all_neighbours() {
        let model = EpidemicModel::new(rules(1.0, 0.0, 0.0), 5);
        let mut grid = Grid::new(3);
        grid.set(1, 1, CellState::Infected);
        let (next, counts) = model.step(&grid, 1);
        assert_eq!(counts.infected, 9);
        assert!(next.cells().iter().all(|c| *c == CellState::Infected));
    }

    #[test]
    fn certain_death_beats_recovery() {
        let model = EpidemicModel::new(rules(0.0, 1.0, 1.0), 5);
        let mut grid = Grid::new(2);
        grid.set(0, 0, CellState::Infected);
        let (next, _) = model.step(&grid, 1);
        assert_eq!(next.get(0, 0), CellState::Dead);
    }

    #[test]
    fn absorbing_states_never_change() {
        let model = EpidemicModel::new(rules(1.0, 1.0, 1.0), 5);
        let grid = Grid::from_rows(vec![vec![CellState::Recovered, CellState::Dead]]).unwrap();
        let (next, _) = model.step(&grid, 1);
        assert_eq!(next, grid);
    }

    #[test]
    fn isolated_susceptible_cells_stay_susceptible() {
        let model = EpidemicModel::new(rules(1.0, 0.0, 0.0), 5);
        let grid = Grid::new(4);
        let (next, counts) = model.step(&grid, 1);
        assert_eq!(next, grid);
        assert_eq!(counts.susceptible, 16);
    }
}

//! Grid state: the cell array for one simulated day.

use crate::{
    error::{SimError, SimResult},
    rng::StreamRng,
    types::CellIndex,
};
use serde::{Deserialize, Serialize};

/// Health state of one individual. The discriminant is the on-disk code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Susceptible = 0,
    Infected    = 1,
    Recovered   = 2,
    Dead        = 3,
}

impl CellState {
    pub const ALL: [CellState; 4] = [
        CellState::Susceptible,
        CellState::Infected,
        CellState::Recovered,
        CellState::Dead,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Susceptible),
            1 => Some(Self::Infected),
            2 => Some(Self::Recovered),
            3 => Some(Self::Dead),
            _ => None,
        }
    }

    /// Column name used in the statistics CSV.
    pub fn label(self) -> &'static str {
        match self {
            Self::Susceptible => "Susceptible",
            Self::Infected    => "Infected",
            Self::Recovered   => "Recovered",
            Self::Dead        => "Dead",
        }
    }

    /// Character used by the console grid sample.
    pub fn symbol(self) -> char {
        match self {
            Self::Susceptible => '.',
            Self::Infected    => 'I',
            Self::Recovered   => 'R',
            Self::Dead        => 'X',
        }
    }
}

/// Population per compartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateCounts {
    pub susceptible: u64,
    pub infected:    u64,
    pub recovered:   u64,
    pub dead:        u64,
}

impl StateCounts {
    pub fn record(&mut self, state: CellState) {
        match state {
            CellState::Susceptible => self.susceptible += 1,
            CellState::Infected    => self.infected += 1,
            CellState::Recovered   => self.recovered += 1,
            CellState::Dead        => self.dead += 1,
        }
    }

    pub fn get(&self, state: CellState) -> u64 {
        match state {
            CellState::Susceptible => self.susceptible,
            CellState::Infected    => self.infected,
            CellState::Recovered   => self.recovered,
            CellState::Dead        => self.dead,
        }
    }

    pub fn total(&self) -> u64 {
        self.susceptible + self.infected + self.recovered + self.dead
    }

    /// Everyone who has ever been infected.
    pub fn ever_infected(&self) -> u64 {
        self.infected + self.recovered + self.dead
    }

    /// Merge a partial count from another block.
    pub fn merge(mut self, other: StateCounts) -> StateCounts {
        self.susceptible += other.susceptible;
        self.infected += other.infected;
        self.recovered += other.recovered;
        self.dead += other.dead;
        self
    }
}

/// Half-open rectangle of cells: rows [row_start, row_end), cols [col_start, col_end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub row_start: usize,
    pub row_end:   usize,
    pub col_start: usize,
    pub col_end:   usize,
}

impl Bounds {
    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }

    pub fn cols(&self) -> usize {
        self.col_end - self.col_start
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..self.row_end).contains(&row) && (self.col_start..self.col_end).contains(&col)
    }

    /// Grow by `margin` cells on every side, clipped to a rows × cols grid.
    pub fn expanded(&self, margin: usize, rows: usize, cols: usize) -> Bounds {
        Bounds {
            row_start: self.row_start.saturating_sub(margin),
            row_end:   (self.row_end + margin).min(rows),
            col_start: self.col_start.saturating_sub(margin),
            col_end:   (self.col_end + margin).min(cols),
        }
    }
}

/// Row-major rows × cols cell array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows:  usize,
    cols:  usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// An all-susceptible square grid.
    pub fn new(size: usize) -> Self {
        Self::with_dimensions(size, size)
    }

    pub fn with_dimensions(rows: usize, cols: usize) -> Self {
        Self { rows, cols, cells: vec![CellState::Susceptible; rows * cols] }
    }

    /// Build from nested rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> SimResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(SimError::RaggedGrid { row, expected: cols, actual: values.len() });
            }
            cells.extend_from_slice(values);
        }
        Ok(Self { rows: rows.len(), cols, cells })
    }

    /// Place `count` distinct infected cells uniformly at random.
    pub fn seed_infected(&mut self, count: usize, rng: &mut StreamRng) -> SimResult<()> {
        let available = self
            .cells
            .iter()
            .filter(|c| **c == CellState::Susceptible)
            .count();
        if count > available {
            return Err(SimError::InvalidConfig(format!(
                "cannot place {count} infected cells in a grid with {available} susceptible cells"
            )));
        }
        let mut placed = 0;
        while placed < count {
            let row = rng.next_u64_below(self.rows as u64) as usize;
            let col = rng.next_u64_below(self.cols as u64) as usize;
            let idx = self.index(row, col);
            if self.cells[idx] == CellState::Susceptible {
                self.cells[idx] = CellState::Infected;
                placed += 1;
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn bounds(&self) -> Bounds {
        Bounds { row_start: 0, row_end: self.rows, col_start: 0, col_end: self.cols }
    }

    pub fn index(&self, row: usize, col: usize) -> CellIndex {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> CellState {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, state: CellState) {
        let idx = self.index(row, col);
        self.cells[idx] = state;
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn row(&self, row: usize) -> &[CellState] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Infected cells among the 8 Moore neighbours. Edges do not wrap.
    pub fn infected_neighbors(&self, row: usize, col: usize) -> u32 {
        let mut count = 0;
        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                if (r, c) != (row, col) && self.get(r, c) == CellState::Infected {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn counts(&self) -> StateCounts {
        self.cells.iter().fold(StateCounts::default(), |mut acc, c| {
            acc.record(*c);
            acc
        })
    }

    /// Copy of the cells inside `bounds`, row-major.
    pub fn extract(&self, bounds: Bounds) -> Vec<CellState> {
        let mut out = Vec::with_capacity(bounds.rows() * bounds.cols());
        for row in bounds.row_start..bounds.row_end {
            let start = self.index(row, bounds.col_start);
            out.extend_from_slice(&self.cells[start..start + bounds.cols()]);
        }
        out
    }

    /// Overwrite the cells inside `bounds` with a row-major block.
    pub fn write_block(&mut self, bounds: Bounds, block: &[CellState]) {
        debug_assert_eq!(block.len(), bounds.rows() * bounds.cols());
        let width = bounds.cols();
        for (i, row) in (bounds.row_start..bounds.row_end).enumerate() {
            let start = self.index(row, bounds.col_start);
            self.cells[start..start + width].copy_from_slice(&block[i * width..(i + 1) * width]);
        }
    }
}

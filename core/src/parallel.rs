//! Parallel coordinator: block decomposition with halo cells.
//!
//! EXECUTION ORDER (every simulated day):
//!   1. Each block copies its owned cells plus a one-cell halo from the
//!      committed previous-day grid. Nobody writes that grid.
//!   2. Blocks compute their owned cells into private buffers.
//!   3. Barrier: the coordinator waits for every block.
//!   4. Blocks are stitched into the new grid and partial counts reduced.
//!
//! Every draw is keyed by (day, cell), so the result is identical to the
//! sequential sweep for any worker count.

use crate::{
    error::SimResult,
    grid::{Bounds, CellState, Grid, StateCounts},
    model::{CellView, EpidemicModel},
    stepper::DayStepper,
    timing::ExecutionTime,
    types::Day,
};
use rayon::prelude::*;

/// One block of the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Cells this block computes.
    pub owned:    Bounds,
    /// Owned cells plus the neighbouring ring it must read.
    pub halo:     Bounds,
}

/// Square-ish tiling of a rows × cols grid for a number of workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub rows:           usize,
    pub cols:           usize,
    pub blocks_per_dim: usize,
    pub block_rows:     usize,
    pub block_cols:     usize,
    pub partitions:     Vec<Partition>,
}

impl BlockLayout {
    /// blocks_per_dim = ceil(sqrt(workers)); block size = ceil(extent / blocks_per_dim).
    /// Blocks that fall entirely outside the grid are dropped.
    pub fn new(rows: usize, cols: usize, workers: usize) -> Self {
        let blocks_per_dim = ceil_sqrt(workers.max(1));
        let block_rows = rows.div_ceil(blocks_per_dim).max(1);
        let block_cols = cols.div_ceil(blocks_per_dim).max(1);

        let mut partitions = Vec::with_capacity(blocks_per_dim * blocks_per_dim);
        for block_id in 0..blocks_per_dim * blocks_per_dim {
            let block_row = block_id / blocks_per_dim;
            let block_col = block_id % blocks_per_dim;
            let row_start = (block_row * block_rows).min(rows);
            let col_start = (block_col * block_cols).min(cols);
            let owned = Bounds {
                row_start,
                row_end: (row_start + block_rows).min(rows),
                col_start,
                col_end: (col_start + block_cols).min(cols),
            };
            if owned.is_empty() {
                continue;
            }
            partitions.push(Partition { owned, halo: owned.expanded(1, rows, cols) });
        }

        Self { rows, cols, blocks_per_dim, block_rows, block_cols, partitions }
    }

    /// Total owned cells; equals rows × cols when the tiling is exact.
    pub fn covered_cells(&self) -> usize {
        self.partitions.iter().map(|p| p.owned.rows() * p.owned.cols()).sum()
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut b = 1;
    while b * b < n {
        b += 1;
    }
    b
}

/// A block's private copy of the previous day: owned cells plus ghost ring.
pub struct HaloBlock {
    bounds:    Bounds,
    grid_rows: usize,
    grid_cols: usize,
    cells:     Vec<CellState>,
}

impl HaloBlock {
    pub fn copy_from(grid: &Grid, halo: Bounds) -> Self {
        Self {
            bounds:    halo,
            grid_rows: grid.rows(),
            grid_cols: grid.cols(),
            cells:     grid.extract(halo),
        }
    }

    fn local(&self, row: usize, col: usize) -> CellState {
        debug_assert!(self.bounds.contains(row, col), "({row}, {col}) outside halo");
        let r = row - self.bounds.row_start;
        let c = col - self.bounds.col_start;
        self.cells[r * self.bounds.cols() + c]
    }
}

impl CellView for HaloBlock {
    fn state(&self, row: usize, col: usize) -> CellState {
        self.local(row, col)
    }

    fn infected_neighbors(&self, row: usize, col: usize) -> u32 {
        let mut count = 0;
        for r in row.saturating_sub(1)..=(row + 1).min(self.grid_rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.grid_cols - 1) {
                if (r, c) != (row, col) && self.local(r, c) == CellState::Infected {
                    count += 1;
                }
            }
        }
        count
    }
}

struct BlockResult {
    owned:  Bounds,
    cells:  Vec<CellState>,
    counts: StateCounts,
}

pub struct ParallelCoordinator {
    model:   EpidemicModel,
    workers: usize,
    pool:    rayon::ThreadPool,
    layout:  Option<BlockLayout>,
}

impl ParallelCoordinator {
    pub fn new(model: EpidemicModel, workers: usize) -> SimResult<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sir-worker-{i}"))
            .build()?;
        Ok(Self { model, workers, pool, layout: None })
    }

    /// Partitions for `grid`, rebuilding the layout when its shape changes.
    fn partitions_for(&mut self, grid: &Grid) -> Vec<Partition> {
        let stale = self
            .layout
            .as_ref()
            .is_none_or(|l| l.rows != grid.rows() || l.cols != grid.cols());
        if stale {
            let layout = BlockLayout::new(grid.rows(), grid.cols(), self.workers);
            log::debug!(
                "Block layout: {} blocks ({}x{} per block) for {} workers",
                layout.partitions.len(),
                layout.block_rows,
                layout.block_cols,
                self.workers
            );
            self.layout = Some(layout);
        }
        self.layout
            .as_ref()
            .map(|l| l.partitions.clone())
            .unwrap_or_default()
    }
}

impl DayStepper for ParallelCoordinator {
    fn name(&self) -> &'static str { "parallel" }

    fn workers(&self) -> usize { self.workers }

    fn step(&mut self, previous: &Grid, day: Day) -> SimResult<(Grid, StateCounts)> {
        let partitions = self.partitions_for(previous);
        let model = &self.model;
        let grid_cols = previous.cols();

        // collect() returns only once every block has finished: the barrier.
        let results: Vec<BlockResult> = self.pool.install(|| {
            partitions
                .par_iter()
                .map(|partition| {
                    let halo = HaloBlock::copy_from(previous, partition.halo);
                    let (cells, counts) =
                        model.advance_region(&halo, day, partition.owned, grid_cols);
                    BlockResult { owned: partition.owned, cells, counts }
                })
                .collect()
        });

        let mut next = Grid::with_dimensions(previous.rows(), previous.cols());
        let mut counts = StateCounts::default();
        for result in results {
            next.write_block(result.owned, &result.cells);
            counts = counts.merge(result.counts);
        }
        Ok((next, counts))
    }

    fn execution_time(&self, seconds: f64) -> ExecutionTime {
        ExecutionTime::parallel(seconds, self.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_tiles_the_whole_grid() {
        for workers in [1, 2, 3, 4, 5, 8, 16] {
            let layout = BlockLayout::new(37, 37, workers);
            assert_eq!(layout.covered_cells(), 37 * 37, "workers={workers}");
        }
    }

    #[test]
    fn layout_matches_ceil_sqrt_rule() {
        let layout = BlockLayout::new(1000, 1000, 8);
        assert_eq!(layout.blocks_per_dim, 3);
        assert_eq!(layout.block_rows, 334);
        assert_eq!(layout.partitions.len(), 9);
        let last = layout.partitions.last().unwrap();
        assert_eq!(last.owned.row_end, 1000);
        assert_eq!(last.owned.rows(), 332);
    }

    #[test]
    fn halo_is_clipped_at_grid_edges() {
        let layout = BlockLayout::new(10, 10, 4);
        let first = layout.partitions[0];
        assert_eq!(first.owned, Bounds { row_start: 0, row_end: 5, col_start: 0, col_end: 5 });
        assert_eq!(first.halo, Bounds { row_start: 0, row_end: 6, col_start: 0, col_end: 6 });
    }

    #[test]
    fn tiny_grids_drop_empty_blocks() {
        let layout = BlockLayout::new(2, 2, 9);
        assert!(layout.partitions.iter().all(|p| !p.owned.is_empty()));
        assert_eq!(layout.covered_cells(), 4);
    }

    #[test]
    fn halo_view_counts_like_the_full_grid() {
        let mut grid = Grid::new(6);
        for (r, c) in [(2, 2), (2, 3), (3, 3), (0, 5)] {
            grid.set(r, c, CellState::Infected);
        }
        let layout = BlockLayout::new(6, 6, 4);
        for partition in &layout.partitions {
            let halo = HaloBlock::copy_from(&grid, partition.halo);
            let owned = partition.owned;
            for row in owned.row_start..owned.row_end {
                for col in owned.col_start..owned.col_end {
                    assert_eq!(
                        CellView::infected_neighbors(&halo, row, col),
                        grid.infected_neighbors(row, col),
                        "cell ({row}, {col})"
                    );
                }
            }
        }
    }
}

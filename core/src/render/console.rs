//! Console grid sample: a coarse character map of the grid.

use crate::grid::Grid;

/// Side of the sampled square, in cells.
pub const SAMPLE_SIZE: usize = 50;

/// Sample every `step`-th cell (step = extent / SAMPLE_SIZE, at least 1)
/// and render one character per sampled cell:
/// `.` susceptible, `I` infected, `R` recovered, `X` dead.
pub fn grid_sample(grid: &Grid, sample_size: usize) -> String {
    let row_step = (grid.rows() / sample_size.max(1)).max(1);
    let col_step = (grid.cols() / sample_size.max(1)).max(1);

    let mut lines = Vec::new();
    for i in (0..sample_size).take_while(|i| i * row_step < grid.rows()) {
        let line: String = (0..sample_size)
            .take_while(|j| j * col_step < grid.cols())
            .map(|j| grid.get(i * row_step, j * col_step).symbol())
            .collect();
        lines.push(line);
    }
    lines.join("\n")
}

/// Sample block as printed under a progress line.
pub fn print_grid_summary(grid: &Grid, day: u64) {
    println!();
    println!("  Grid sample (day {day}):");
    for line in grid_sample(grid, SAMPLE_SIZE).lines() {
        println!("  {line}");
    }
}

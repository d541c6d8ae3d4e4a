//! GIF animations of snapshot sequences.
//!
//! Each frame is labelled with the day its snapshot was taken on, as
//! recorded in the snapshot index. The side-by-side animation stops at the
//! shorter of the two sequences.

use super::{render_err, state_color};
use crate::{
    error::{SimError, SimResult},
    grid::{CellState, Grid},
    snapshot::{frame_day, SnapshotSequence},
    types::Day,
};
use plotters::{coord::Shift, prelude::*};
use std::path::Path;

pub const DEFAULT_FPS: u32 = 10;

const FONT: &str = "sans-serif";
const PANEL_SIDE:    u32 = 600;
const TITLE_HEIGHT:  u32 = 50;
const LEGEND_HEIGHT: u32 = 40;

fn frame_delay_ms(fps: u32) -> u32 {
    1000 / fps.max(1)
}

fn day_label(day: Day) -> String {
    format!("Day: {day}")
}

/// Day shown for `frame` of a side-by-side animation. The sequential run's
/// index wins when the two runs disagree.
fn paired_frame_day(sequential: &SnapshotSequence, parallel: &SnapshotSequence, frame: usize) -> Day {
    let day = sequential.day_of_frame(frame).unwrap_or_else(|| frame_day(frame));
    if let Some(other) = parallel.day_of_frame(frame) {
        if other != day {
            log::warn!("Frame {frame}: sequential snapshot is day {day}, parallel is day {other}");
        }
    }
    day
}

/// Nearest-cell resampling of `grid` onto every pixel of `area`.
pub fn draw_grid<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, grid: &Grid) -> SimResult<()> {
    if grid.is_empty() {
        return Ok(());
    }
    let (width, height) = area.dim_in_pixel();
    for py in 0..height {
        let row = py as usize * grid.rows() / height as usize;
        for px in 0..width {
            let col = px as usize * grid.cols() / width as usize;
            area.draw_pixel((px as i32, py as i32), &state_color(grid.get(row, col)))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

/// Colour swatch and label for each compartment.
fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> SimResult<()> {
    let style = TextStyle::from((FONT, 16).into_font());
    let (width, _) = area.dim_in_pixel();
    let slot = (width / CellState::ALL.len() as u32) as i32;
    for (i, state) in CellState::ALL.iter().enumerate() {
        let x = i as i32 * slot + 10;
        area.draw(&Rectangle::new([(x, 12), (x + 16, 28)], state_color(*state).filled()))
            .map_err(render_err)?;
        area.draw_text(state.label(), &style, (x + 22, 12)).map_err(render_err)?;
    }
    Ok(())
}

fn ensure_frames(sequence: &SnapshotSequence, label: &str) -> SimResult<()> {
    if sequence.is_empty() {
        return Err(SimError::Render(format!("no snapshots to animate for {label}")));
    }
    Ok(())
}

/// Animate one run's snapshot sequence.
pub fn create_animation(
    sequence: &SnapshotSequence,
    title: &str,
    output: &Path,
    fps: u32,
) -> SimResult<()> {
    ensure_frames(sequence, title)?;
    let size = (PANEL_SIDE, TITLE_HEIGHT + PANEL_SIDE + LEGEND_HEIGHT);
    let root = BitMapBackend::gif(output, size, frame_delay_ms(fps))
        .map_err(render_err)?
        .into_drawing_area();

    for (day, grid) in sequence.iter() {
        root.fill(&WHITE).map_err(render_err)?;
        let (header, rest) = root.split_vertically(TITLE_HEIGHT);
        let (body, legend) = rest.split_vertically(PANEL_SIDE);
        header
            .titled(&format!("{title}    {}", day_label(day)), (FONT, 22).into_font())
            .map_err(render_err)?;
        draw_grid(&body, grid)?;
        draw_legend(&legend)?;
        root.present().map_err(render_err)?;
    }

    log::info!("Animation saved: {} ({} frames)", output.display(), sequence.len());
    Ok(())
}

/// Animate two runs next to each other; panel titles carry the run times
/// and the parallel panel the speedup.
pub fn create_side_by_side_animation(
    sequential: &SnapshotSequence,
    parallel: &SnapshotSequence,
    time_sequential: f64,
    time_parallel: f64,
    output: &Path,
    fps: u32,
) -> SimResult<()> {
    ensure_frames(sequential, "sequential run")?;
    ensure_frames(parallel, "parallel run")?;
    let speedup = time_sequential / time_parallel;
    let frames = sequential.len().min(parallel.len());

    let size = (2 * PANEL_SIDE, 2 * TITLE_HEIGHT + PANEL_SIDE + LEGEND_HEIGHT);
    let root = BitMapBackend::gif(output, size, frame_delay_ms(fps))
        .map_err(render_err)?
        .into_drawing_area();
    let titles = [
        format!("Sequential (time: {time_sequential:.2}s)"),
        format!("Parallel (time: {time_parallel:.2}s, speedup: {speedup:.2}x)"),
    ];

    for frame in 0..frames {
        let label = day_label(paired_frame_day(sequential, parallel, frame));
        root.fill(&WHITE).map_err(render_err)?;
        let body = root
            .titled(&label, (FONT, 26).into_font())
            .map_err(render_err)?;
        let (panels, legend) = body.split_vertically(TITLE_HEIGHT + PANEL_SIDE);
        let grids = [sequential.grid(frame), parallel.grid(frame)];
        for ((panel, title), grid) in panels.split_evenly((1, 2)).iter().zip(&titles).zip(grids) {
            let inner = panel.titled(title, (FONT, 18).into_font()).map_err(render_err)?;
            if let Some(grid) = grid {
                draw_grid(&inner.margin(0, 0, 5, 5), grid)?;
            }
        }
        draw_legend(&legend)?;
        root.present().map_err(render_err)?;
    }

    log::info!("Side-by-side animation saved: {} ({frames} frames)", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_follows_fps() {
        assert_eq!(frame_delay_ms(10), 100);
        assert_eq!(frame_delay_ms(0), 1000);
    }

    #[test]
    fn labels_follow_indexed_days() {
        let grid = Grid::new(2);
        let sequential = SnapshotSequence::from_frames(vec![(30, grid.clone()), (60, grid.clone())]);
        let parallel = SnapshotSequence::from_frames(vec![(30, grid.clone()), (90, grid)]);
        assert_eq!(day_label(paired_frame_day(&sequential, &parallel, 0)), "Day: 30");
        assert_eq!(day_label(paired_frame_day(&sequential, &parallel, 1)), "Day: 60");
    }
}

//! PNG charts: epidemic evolution, sequential vs parallel comparison and
//! strong-scaling analysis.

use super::{render_err, state_color, INFECTED_COLOR, RECOVERED_COLOR, SUSCEPTIBLE_COLOR};
use crate::{
    error::{SimError, SimResult},
    grid::CellState,
    scaling::ScalingPoint,
    statistics::DayRecord,
};
use plotters::{coord::Shift, prelude::*};
use std::path::Path;

const FONT: &str = "sans-serif";
const EVOLUTION_SIZE:  (u32, u32) = (1200, 1000);
const COMPARISON_SIZE: (u32, u32) = (1600, 1200);
const SCALING_SIZE:    (u32, u32) = (1400, 600);

fn non_empty<'a>(records: &'a [DayRecord], label: &str) -> SimResult<&'a DayRecord> {
    records
        .last()
        .ok_or_else(|| SimError::EmptyStatistics { label: label.to_string() })
}

/// Four compartment curves over time, with a legend.
fn draw_compartments<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    records: &[DayRecord],
    caption: &str,
) -> SimResult<()> {
    let max_day = records.last().map_or(1, |r| r.day.max(1)) as f64;
    let population = records.first().map_or(1, |r| r.population().max(1)) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..max_day, 0f64..population * 1.05)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc("Population")
        .draw()
        .map_err(render_err)?;

    for state in CellState::ALL {
        let color = state_color(state);
        chart
            .draw_series(LineSeries::new(
                records.iter().map(|r| (r.day as f64, r.counts().get(state) as f64)),
                color.stroke_width(2),
            ))
            .map_err(render_err)?
            .label(state.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Final-day compartment sizes as bars, each labelled with its value.
fn draw_final_state<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    record: &DayRecord,
) -> SimResult<()> {
    let counts = record.counts();
    let max_y = CellState::ALL.iter().map(|s| counts.get(*s)).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Final population state", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(20)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..4f64, 0f64..max_y * 1.15)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_: &f64| String::new())
        .y_desc("Population")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(CellState::ALL.iter().enumerate().map(|(i, state)| {
            let x = i as f64;
            Rectangle::new(
                [(x + 0.15, 0.0), (x + 0.85, counts.get(*state) as f64)],
                state_color(*state).mix(0.8).filled(),
            )
        }))
        .map_err(render_err)?;
    chart
        .draw_series(CellState::ALL.iter().enumerate().map(|(i, state)| {
            let value = counts.get(*state);
            Text::new(
                format!("{}: {value}", state.label()),
                (i as f64 + 0.15, value as f64 + max_y * 0.03),
                (FONT, 16).into_font(),
            )
        }))
        .map_err(render_err)?;
    Ok(())
}

/// One quantity of two runs on shared axes.
fn draw_pair<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    y_desc: &str,
    sequential: &[DayRecord],
    parallel: &[DayRecord],
    value: impl Fn(&DayRecord) -> f64,
) -> SimResult<()> {
    let max_day = sequential
        .iter()
        .chain(parallel)
        .map(|r| r.day)
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let max_y = sequential
        .iter()
        .chain(parallel)
        .map(&value)
        .fold(0.0, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..max_day, 0f64..max_y * 1.05)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc(y_desc)
        .draw()
        .map_err(render_err)?;

    for (records, label, color) in [
        (sequential, "Sequential", INFECTED_COLOR),
        (parallel, "Parallel", SUSCEPTIBLE_COLOR),
    ] {
        chart
            .draw_series(LineSeries::new(
                records.iter().map(|r| (r.day as f64, value(r))),
                color.stroke_width(2),
            ))
            .map_err(render_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Evolution chart of one run: compartment curves on top, final-state bars below.
pub fn plot_epidemic_evolution(records: &[DayRecord], output: &Path, title: &str) -> SimResult<()> {
    let last = non_empty(records, title)?;

    let root = BitMapBackend::new(output, EVOLUTION_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let panels = root.split_evenly((2, 1));
    draw_compartments(&panels[0], records, title)?;
    draw_final_state(&panels[1], last)?;
    root.present().map_err(render_err)?;

    log::info!("Chart saved: {}", output.display());
    Ok(())
}

/// 2×2 comparison: infected, R0, then each run's full evolution.
pub fn plot_comparison(sequential: &[DayRecord], parallel: &[DayRecord], output: &Path) -> SimResult<()> {
    non_empty(sequential, "sequential run")?;
    non_empty(parallel, "parallel run")?;

    let root = BitMapBackend::new(output, COMPARISON_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let panels = root.split_evenly((2, 2));
    draw_pair(&panels[0], "Infected comparison", "Infected", sequential, parallel, |r| {
        r.infected as f64
    })?;
    draw_pair(&panels[1], "R0 comparison", "R0", sequential, parallel, |r| r.r0)?;
    draw_compartments(&panels[2], sequential, "Evolution - Sequential")?;
    draw_compartments(&panels[3], parallel, "Evolution - Parallel")?;
    root.present().map_err(render_err)?;

    log::info!("Comparison saved: {}", output.display());
    Ok(())
}

/// Strong scaling: measured vs ideal speedup, and time per core count.
pub fn plot_scaling(points: &[ScalingPoint], output: &Path) -> SimResult<()> {
    if points.is_empty() {
        return Err(SimError::EmptyStatistics { label: "scaling results".into() });
    }
    let max_cores = points.iter().map(|p| p.cores).max().unwrap_or(1) as f64;
    let max_speedup = points.iter().map(|p| p.speedup).fold(max_cores, f64::max);
    let max_time = points.iter().map(|p| p.time).fold(0.0, f64::max).max(f64::EPSILON);

    let root = BitMapBackend::new(output, SCALING_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let panels = root.split_evenly((1, 2));

    let mut speedup = ChartBuilder::on(&panels[0])
        .caption("Strong scaling - Speedup", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..max_cores + 1.0, 0f64..max_speedup * 1.1)
        .map_err(render_err)?;
    speedup
        .configure_mesh()
        .x_desc("Cores")
        .y_desc("Speedup")
        .draw()
        .map_err(render_err)?;
    speedup
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.cores as f64, p.speedup)),
            SUSCEPTIBLE_COLOR.stroke_width(2),
        ))
        .map_err(render_err)?
        .label("Measured speedup")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SUSCEPTIBLE_COLOR.stroke_width(2)));
    speedup
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.cores as f64, p.speedup), 5, SUSCEPTIBLE_COLOR.filled())),
        )
        .map_err(render_err)?;
    speedup
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.cores as f64, p.cores as f64)),
            INFECTED_COLOR.stroke_width(2),
        ))
        .map_err(render_err)?
        .label("Ideal (linear)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], INFECTED_COLOR.stroke_width(2)));
    speedup
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    let mut time = ChartBuilder::on(&panels[1])
        .caption("Execution time vs cores", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..max_cores + 1.0, 0f64..max_time * 1.2)
        .map_err(render_err)?;
    time.configure_mesh()
        .x_desc("Cores")
        .y_desc("Time (s)")
        .draw()
        .map_err(render_err)?;
    time.draw_series(LineSeries::new(
        points.iter().map(|p| (p.cores as f64, p.time)),
        RECOVERED_COLOR.stroke_width(2),
    ))
    .map_err(render_err)?;
    time.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.cores as f64, p.time), 5, RECOVERED_COLOR.filled())),
    )
    .map_err(render_err)?;
    time.draw_series(points.iter().map(|p| {
        Text::new(
            format!("{:.2}s", p.time),
            (p.cores as f64, p.time + max_time * 0.05),
            (FONT, 16).into_font(),
        )
    }))
    .map_err(render_err)?;
    root.present().map_err(render_err)?;

    log::info!("Scaling analysis saved: {}", output.display());
    Ok(())
}

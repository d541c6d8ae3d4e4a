//! Strong-scaling experiment: a fixed problem run on the parallel engine
//! for an increasing number of workers.
//!
//! File format (header is exact):
//!   Cores,Time,Speedup,Efficiency
//! Every float with 4 decimals. The first measured point is the baseline.

use crate::{
    config::SimConfig,
    engine::SimulationDriver,
    error::{SimError, SimResult},
    types::Day,
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

pub const SCALING_HEADER: [&str; 4] = ["Cores", "Time", "Speedup", "Efficiency"];
pub const DEFAULT_THREAD_COUNTS: [usize; 4] = [1, 2, 4, 8];
pub const DEFAULT_SCALING_DAYS: Day = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingPoint {
    #[serde(rename = "Cores")]
    pub cores:      usize,
    #[serde(rename = "Time")]
    pub time:       f64,
    #[serde(rename = "Speedup")]
    pub speedup:    f64,
    #[serde(rename = "Efficiency")]
    pub efficiency: f64,
}

/// Measured (cores, seconds) pairs turned into speedup and efficiency
/// against the first pair.
pub fn scaling_points(timings: &[(usize, f64)]) -> Vec<ScalingPoint> {
    let Some(&(_, base)) = timings.first() else { return Vec::new() };
    timings
        .iter()
        .map(|&(cores, time)| {
            let speedup = base / time;
            ScalingPoint { cores, time, speedup, efficiency: speedup / cores as f64 }
        })
        .collect()
}

/// Worker counts from `requested` that this machine can actually run.
pub fn usable_thread_counts(requested: &[usize]) -> Vec<usize> {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested
        .iter()
        .copied()
        .filter(|&n| {
            let usable = n > 0 && n <= available;
            if !usable {
                log::warn!("Skipping {n} workers: only {available} available");
            }
            usable
        })
        .collect()
}

/// Run the parallel engine for `days` days once per usable worker count.
/// Nothing is written to disk; only the stepping loop is timed.
pub fn run_strong_scaling(
    config: &SimConfig,
    thread_counts: &[usize],
    days: Day,
) -> SimResult<Vec<ScalingPoint>> {
    let counts = usable_thread_counts(thread_counts);
    if counts.is_empty() {
        return Err(SimError::InvalidConfig(
            "no usable worker count for the scaling experiment".into(),
        ));
    }

    let mut timings = Vec::with_capacity(counts.len());
    for workers in counts {
        let config = SimConfig { days, ..config.clone() };
        let mut driver = SimulationDriver::parallel(config, workers)?;
        let summary = driver.run()?;
        log::info!(
            "Scaling: {workers} workers, {} days in {:.4}s",
            summary.days_simulated,
            summary.execution_time.seconds
        );
        timings.push((workers, summary.execution_time.seconds));
    }
    Ok(scaling_points(&timings))
}

pub fn save_csv<P: AsRef<Path>>(path: P, points: &[ScalingPoint]) -> SimResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SCALING_HEADER)?;
    for p in points {
        writer.write_record([
            p.cores.to_string(),
            format!("{:.4}", p.time),
            format!("{:.4}", p.speedup),
            format!("{:.4}", p.efficiency),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> SimResult<Vec<ScalingPoint>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();
    for result in reader.deserialize() {
        points.push(result?);
    }
    Ok(points)
}

/// Console table of a scaling run.
pub struct ScalingTable<'a>(pub &'a [ScalingPoint]);

impl fmt::Display for ScalingTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>6} {:>12} {:>10} {:>12}", "Cores", "Time (s)", "Speedup", "Efficiency")?;
        writeln!(f, "{}", "-".repeat(43))?;
        for p in self.0 {
            writeln!(
                f,
                "{:>6} {:>12.4} {:>9.2}x {:>11.1}%",
                p.cores,
                p.time,
                p.speedup,
                p.efficiency * 100.0
            )?;
        }
        Ok(())
    }
}

//! The simulation driver: owns the day-stepping loop.
//!
//! EXECUTION ORDER (every day, fixed):
//!   1. Stepper computes day d from day d - 1 (read old, write new, swap).
//!   2. Statistics accumulator records counts and R0 for day d.
//!   3. The record is appended to the statistics CSV and flushed.
//!   4. A grid snapshot is written when d is a multiple of SNAPSHOT_INTERVAL.
//!   5. The run stops at the horizon or on the first day with no infected.
//!
//! Day 0 is the seeded initial grid: it is recorded and snapshotted
//! before the first step.

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    grid::Grid,
    manifest::{new_run_id, RunManifest, StopReason},
    model::EpidemicModel,
    parallel::ParallelCoordinator,
    r0::{CumulativeRatio, R0Estimator},
    render::console,
    rng::RngBank,
    snapshot::{is_snapshot_day, SnapshotRecorder},
    statistics::{DayRecord, StatisticsAccumulator, StatsWriter},
    stepper::{DayStepper, SequentialStepper},
    timing::ExecutionTime,
    types::{Day, RunId},
};
use chrono::Utc;
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

/// File layout of one run's output directory.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dir:          PathBuf,
    pub stats_file:   PathBuf,
    pub timing_file:  PathBuf,
    pub snapshot_dir: PathBuf,
    pub manifest:     PathBuf,
}

impl RunOutput {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            stats_file:   dir.join("statistics.csv"),
            timing_file:  dir.join("execution_time.txt"),
            snapshot_dir: dir.join("grid_snapshots"),
            manifest:     dir.join("run.json"),
            dir,
        }
    }
}

struct OutputSinks {
    layout:    RunOutput,
    stats:     StatsWriter,
    snapshots: SnapshotRecorder,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id:         RunId,
    pub engine:         &'static str,
    pub workers:        usize,
    pub days_simulated: Day,
    pub stop_reason:    StopReason,
    pub execution_time: ExecutionTime,
    pub final_record:   DayRecord,
}

impl RunSummary {
    /// Share of the population ever infected, in percent.
    pub fn percent_affected(&self) -> f64 {
        let population = self.final_record.population();
        if population == 0 {
            return 0.0;
        }
        self.final_record.counts().ever_infected() as f64 / population as f64 * 100.0
    }
}

pub struct SimulationDriver {
    pub run_id: RunId,
    config:     SimConfig,
    stepper:    Box<dyn DayStepper>,
    grid:       Grid,
    stats:      StatisticsAccumulator,
    output:     Option<OutputSinks>,
    verbose:    bool,
}

impl SimulationDriver {
    /// Seed the initial grid and wire the default R0 estimator.
    pub fn new(config: SimConfig, stepper: Box<dyn DayStepper>) -> SimResult<Self> {
        config.validate()?;
        let mut grid = Grid::new(config.grid_size);
        let mut rng = RngBank::new(config.seed).for_seeding();
        grid.seed_infected(config.initial_infected, &mut rng)?;

        let estimator = CumulativeRatio::new(config.initial_infected as u64);
        Ok(Self {
            run_id: new_run_id(),
            stats: StatisticsAccumulator::new(Box::new(estimator)),
            config,
            stepper,
            grid,
            output: None,
            verbose: false,
        })
    }

    /// Driver over the single-threaded sweep.
    pub fn sequential(config: SimConfig) -> SimResult<Self> {
        let model = EpidemicModel::new(config.model.clone(), config.seed);
        Self::new(config, Box::new(SequentialStepper::new(model)))
    }

    /// Driver over the block-parallel coordinator.
    pub fn parallel(config: SimConfig, workers: usize) -> SimResult<Self> {
        let model = EpidemicModel::new(config.model.clone(), config.seed);
        Self::new(config, Box::new(ParallelCoordinator::new(model, workers)?))
    }

    /// Replace the R0 estimator. Fails once day 0 has been recorded.
    pub fn with_estimator(mut self, estimator: Box<dyn R0Estimator>) -> SimResult<Self> {
        if let Some(last) = self.stats.last() {
            return Err(SimError::InvalidConfig(format!(
                "R0 estimator '{}' set after day {} was recorded",
                estimator.name(),
                last.day
            )));
        }
        self.stats = StatisticsAccumulator::new(estimator);
        Ok(self)
    }

    /// Stream statistics and snapshots into `dir` as the run progresses.
    pub fn with_output<P: AsRef<Path>>(mut self, dir: P) -> SimResult<Self> {
        let layout = RunOutput::in_dir(dir);
        std::fs::create_dir_all(&layout.dir)?;
        let stats = StatsWriter::create(&layout.stats_file)?;
        let snapshots = SnapshotRecorder::create(&layout.snapshot_dir)?;
        self.output = Some(OutputSinks { layout, stats, snapshots });
        Ok(self)
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &[DayRecord] {
        self.stats.history()
    }

    /// Last recorded day, or None before day 0 is recorded.
    pub fn current_day(&self) -> Option<Day> {
        self.stats.last().map(|r| r.day)
    }

    /// Advance one day (recording day 0 first if needed). This is the
    /// core simulation step.
    pub fn tick(&mut self) -> SimResult<DayRecord> {
        let (day, counts) = match self.current_day() {
            None => (0, self.grid.counts()),
            Some(previous) => {
                let next_day = previous + 1;
                let (next, counts) = self.stepper.step(&self.grid, next_day)?;
                self.grid = next;
                (next_day, counts)
            }
        };
        let record = self.stats.record_day(day, counts)?.clone();

        if let Some(sinks) = self.output.as_mut() {
            sinks.stats.append(&record)?;
            if is_snapshot_day(day) {
                sinks.snapshots.record(&self.grid, day)?;
            }
        }

        if day > 0 && (day == 1 || day.is_multiple_of(self.config.progress_interval)) {
            self.report_progress(&record);
        }
        Ok(record)
    }

    /// Run until the horizon or until the epidemic dies out.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        let started_at = Utc::now();
        log::info!(
            "Run {} started: engine={} workers={} grid={}x{} days={} seed={}",
            self.run_id,
            self.stepper.name(),
            self.stepper.workers(),
            self.config.grid_size,
            self.config.grid_size,
            self.config.days,
            self.config.seed
        );

        let clock = Instant::now();
        let mut last = self.tick()?;
        let stop_reason = loop {
            if last.infected == 0 {
                break StopReason::NoInfected;
            }
            if last.day >= self.config.days {
                break StopReason::Horizon;
            }
            last = self.tick()?;
        };
        let elapsed = clock.elapsed().as_secs_f64();
        let execution_time = self.stepper.execution_time(elapsed);

        if stop_reason == StopReason::NoInfected && self.verbose {
            println!();
            println!("Epidemic ended on day {}", last.day);
        }
        log::info!(
            "Run {} finished at day {} ({stop_reason:?}) in {elapsed:.2}s",
            self.run_id,
            last.day
        );

        if let Some(sinks) = &self.output {
            execution_time.save(&sinks.layout.timing_file)?;
            let manifest = RunManifest {
                run_id:          self.run_id.clone(),
                engine:          self.stepper.name().to_string(),
                workers:         self.stepper.workers(),
                r0_estimator:    self.stats.estimator_name().to_string(),
                started_at,
                days_simulated:  last.day,
                stop_reason,
                elapsed_seconds: elapsed,
                config:          self.config.clone(),
            };
            manifest.save(&sinks.layout.manifest)?;
        }

        Ok(RunSummary {
            run_id:         self.run_id.clone(),
            engine:         self.stepper.name(),
            workers:        self.stepper.workers(),
            days_simulated: last.day,
            stop_reason,
            execution_time,
            final_record:   last,
        })
    }

    fn report_progress(&self, record: &DayRecord) {
        if self.verbose {
            println!(
                "Day {:>3}/{} - Infected: {:>8} - R0: {:>5.2}",
                record.day, self.config.days, record.infected, record.r0
            );
            console::print_grid_summary(&self.grid, record.day);
        } else {
            log::debug!(
                "day={} infected={} r0={:.2}",
                record.day,
                record.infected,
                record.r0
            );
        }
    }
}

//! Sequential vs parallel run comparison and the summary report.
//!
//! Validation bands on the total final-day absolute difference over the
//! four compartments:
//!   0          => identical
//!   (0, 100)   => practically identical
//!   >= 100     => significant differences

use crate::{
    error::{SimError, SimResult},
    grid::CellState,
    statistics::DayRecord,
    timing::Speedup,
};
use chrono::Utc;
use std::{fmt, fs, path::Path};

/// Totals below this are "practically identical".
pub const PRACTICAL_THRESHOLD: u64 = 100;

const RULE_WIDTH: usize = 70;

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Identical,
    PracticallyIdentical,
    Significant,
}

impl Validation {
    pub fn classify(total_diff: u64) -> Self {
        match total_diff {
            0 => Self::Identical,
            d if d < PRACTICAL_THRESHOLD => Self::PracticallyIdentical,
            _ => Self::Significant,
        }
    }

    pub fn message(&self, total_diff: u64) -> String {
        match self {
            Self::Identical => "VALIDATION: OK - results IDENTICAL".to_string(),
            Self::PracticallyIdentical => {
                "VALIDATION: OK - results practically identical (minimal differences)".to_string()
            }
            Self::Significant => format!(
                "VALIDATION: FAILED - significant differences detected (total: {total_diff})"
            ),
        }
    }
}

/// Per-day absolute differences of the four compartments, over the
/// common prefix of both series. Symmetric in its arguments.
pub fn day_by_day_diff(a: &[DayRecord], b: &[DayRecord]) -> Vec<[u64; 4]> {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let (cx, cy) = (x.counts(), y.counts());
            CellState::ALL.map(|state| cx.get(state).abs_diff(cy.get(state)))
        })
        .collect()
}

/// Sum over the four compartments of |a - b| on the final day.
pub fn final_state_diff(a: &DayRecord, b: &DayRecord) -> u64 {
    let (ca, cb) = (a.counts(), b.counts());
    CellState::ALL.iter().map(|s| ca.get(*s).abs_diff(cb.get(*s))).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDiff {
    pub state: CellState,
    pub max:   u64,
    pub mean:  f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct R0Diff {
    pub max:  f64,
    pub mean: f64,
}

#[derive(Debug, Clone)]
pub struct StatsComparison {
    pub sequential_days: usize,
    pub parallel_days:   usize,
    /// Present only when both series have the same length.
    pub columns:         Option<Vec<ColumnDiff>>,
    pub r0:              Option<R0Diff>,
    pub final_sequential: DayRecord,
    pub final_parallel:   DayRecord,
    pub total_final_diff: u64,
    pub validation:       Validation,
}

impl StatsComparison {
    pub fn compute(sequential: &[DayRecord], parallel: &[DayRecord]) -> SimResult<Self> {
        let final_sequential = sequential
            .last()
            .cloned()
            .ok_or_else(|| SimError::EmptyStatistics { label: "sequential run".into() })?;
        let final_parallel = parallel
            .last()
            .cloned()
            .ok_or_else(|| SimError::EmptyStatistics { label: "parallel run".into() })?;

        let days_match = sequential.len() == parallel.len();
        let (columns, r0) = if days_match {
            let diffs = day_by_day_diff(sequential, parallel);
            let n = diffs.len() as f64;
            let columns = CellState::ALL
                .iter()
                .enumerate()
                .map(|(i, state)| ColumnDiff {
                    state: *state,
                    max:   diffs.iter().map(|d| d[i]).max().unwrap_or(0),
                    mean:  diffs.iter().map(|d| d[i] as f64).sum::<f64>() / n,
                })
                .collect();
            let r0_diffs: Vec<f64> = sequential
                .iter()
                .zip(parallel)
                .map(|(a, b)| (a.r0 - b.r0).abs())
                .collect();
            let r0 = R0Diff {
                max:  r0_diffs.iter().copied().fold(0.0, f64::max),
                mean: r0_diffs.iter().sum::<f64>() / n,
            };
            (Some(columns), Some(r0))
        } else {
            log::warn!(
                "Day counts differ ({} vs {}); comparing final state only",
                sequential.len(),
                parallel.len()
            );
            (None, None)
        };

        let total_final_diff = final_state_diff(&final_sequential, &final_parallel);
        Ok(Self {
            sequential_days: sequential.len(),
            parallel_days: parallel.len(),
            columns,
            r0,
            final_sequential,
            final_parallel,
            total_final_diff,
            validation: Validation::classify(total_final_diff),
        })
    }

    pub fn days_match(&self) -> bool {
        self.sequential_days == self.parallel_days
    }

    pub fn is_identical(&self) -> bool {
        self.validation == Validation::Identical
    }

    /// Console report.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatsComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", rule('='))?;
        writeln!(f, "RESULT COMPARISON: SEQUENTIAL VS PARALLEL")?;
        writeln!(f, "{}", rule('='))?;
        writeln!(f)?;
        writeln!(f, "Result identity check:")?;
        writeln!(f, "{}", rule('-'))?;
        writeln!(
            f,
            "Simulated days: {}",
            if self.days_match() { "EQUAL" } else { "DIFFERENT" }
        )?;
        writeln!(f, "  Sequential: {} days", self.sequential_days)?;
        writeln!(f, "  Parallel:   {} days", self.parallel_days)?;
        writeln!(f)?;

        if let (Some(columns), Some(r0)) = (&self.columns, &self.r0) {
            for column in columns {
                let status = if column.max == 0 {
                    "IDENTICAL".to_string()
                } else {
                    format!("Max diff: {}", column.max)
                };
                writeln!(f, "{:12} - {status}", column.state.label())?;
            }
            writeln!(f)?;
            writeln!(
                f,
                "R0           - Max diff: {:.6}, Avg diff: {:.6}",
                r0.max, r0.mean
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Final state:")?;
        writeln!(f, "{}", rule('-'))?;
        writeln!(
            f,
            "{:<15} {:>12} {:>12} {:>12}",
            "State", "Sequential", "Parallel", "Difference"
        )?;
        writeln!(f, "{}", rule('-'))?;
        let (seq, par) = (self.final_sequential.counts(), self.final_parallel.counts());
        for state in CellState::ALL {
            let (a, b) = (seq.get(state), par.get(state));
            writeln!(f, "{:<15} {a:>12} {b:>12} {:>12}", state.label(), a.abs_diff(b))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "R0 final:       {:>12.4} {:>12.4} {:>12.6}",
            self.final_sequential.r0,
            self.final_parallel.r0,
            (self.final_sequential.r0 - self.final_parallel.r0).abs()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", rule('='))?;
        writeln!(f, "{}", self.validation.message(self.total_final_diff))?;
        write!(f, "{}", rule('='))
    }
}

/// Console performance analysis block.
pub fn render_execution_analysis(speedup: &Speedup) -> String {
    ExecutionAnalysis(speedup).to_string()
}

struct ExecutionAnalysis<'a>(&'a Speedup);

impl fmt::Display for ExecutionAnalysis<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let speedup = self.0;
        writeln!(f, "{}", rule('='))?;
        writeln!(f, "PERFORMANCE ANALYSIS")?;
        writeln!(f, "{}", rule('='))?;
        writeln!(f)?;
        writeln!(f, "Sequential time:          {:>10.2} seconds", speedup.sequential_seconds)?;
        writeln!(f, "Parallel time:            {:>10.2} seconds", speedup.parallel_seconds)?;
        writeln!(f, "Cores used:               {:>10}", speedup.cores)?;
        writeln!(f)?;
        writeln!(f, "Speedup:                  {:>10.2}x", speedup.speedup)?;
        writeln!(f, "Ideal speedup:            {:>10.2}x", speedup.cores as f64)?;
        writeln!(
            f,
            "Efficiency:               {:>10}",
            format!("{:.1}%", speedup.efficiency_percent())
        )?;
        writeln!(f)?;
        write!(f, "{}", rule('='))
    }
}

/// The comparison report file: configuration, final results,
/// performance and validation sections.
pub struct SummaryReport<'a> {
    pub comparison: &'a StatsComparison,
    pub speedup:    &'a Speedup,
}

impl SummaryReport<'_> {
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn save(&self, path: &Path) -> SimResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        log::info!("Report saved to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.comparison;
        let s = self.speedup;
        let fin = &c.final_parallel;
        writeln!(f, "SIR SIMULATION COMPARISON REPORT")?;
        writeln!(f, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "{}", rule('='))?;
        writeln!(f)?;
        writeln!(f, "1. CONFIGURATION")?;
        writeln!(f, "{}", rule('-'))?;
        writeln!(f, "Simulated days:     {}", c.final_sequential.day)?;
        writeln!(f, "Cores used:         {}", s.cores)?;
        writeln!(f)?;
        writeln!(f, "2. FINAL RESULTS")?;
        writeln!(f, "{}", rule('-'))?;
        writeln!(f, "Susceptible:        {}", fin.susceptible)?;
        writeln!(f, "Infected:           {}", fin.infected)?;
        writeln!(f, "Recovered:          {}", fin.recovered)?;
        writeln!(f, "Dead:               {}", fin.dead)?;
        writeln!(f, "Final R0:           {:.4}", fin.r0)?;
        writeln!(f)?;
        writeln!(f, "3. PERFORMANCE")?;
        writeln!(f, "{}", rule('-'))?;
        writeln!(f, "Sequential time:    {:.2} seconds", s.sequential_seconds)?;
        writeln!(f, "Parallel time:      {:.2} seconds", s.parallel_seconds)?;
        writeln!(f, "Speedup:            {:.2}x", s.speedup)?;
        writeln!(f, "Efficiency:         {:.1}%", s.efficiency_percent())?;
        writeln!(f)?;
        writeln!(f, "4. VALIDATION")?;
        writeln!(f, "{}", rule('-'))?;
        if c.total_final_diff == 0 {
            writeln!(f, "Status: VALIDATED - identical results")?;
        } else {
            writeln!(f, "Status: Total difference = {}", c.total_final_diff)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", rule('='))
    }
}

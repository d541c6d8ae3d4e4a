//! Execution-time files and speedup arithmetic.
//!
//! File format:
//!   line 1: elapsed seconds (float)
//!   line 2: worker count (integer, parallel runs only)
//! A missing second line means one core.

use crate::error::{SimError, SimResult};
use std::{fs, path::Path};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionTime {
    pub seconds: f64,
    /// None for sequential runs; the file then has a single line.
    pub cores:   Option<usize>,
}

impl ExecutionTime {
    pub fn sequential(seconds: f64) -> Self {
        Self { seconds, cores: None }
    }

    pub fn parallel(seconds: f64, cores: usize) -> Self {
        Self { seconds, cores: Some(cores) }
    }

    pub fn core_count(&self) -> usize {
        self.cores.unwrap_or(1)
    }

    pub fn to_file_contents(&self) -> String {
        match self.cores {
            Some(cores) => format!("{:.4}\n{cores}", self.seconds),
            None => format!("{:.4}", self.seconds),
        }
    }

    pub fn save(&self, path: &Path) -> SimResult<()> {
        fs::write(path, self.to_file_contents())?;
        Ok(())
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|reason| SimError::MalformedTiming {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        let seconds = lines
            .next()
            .ok_or_else(|| "empty file".to_string())?
            .parse::<f64>()
            .map_err(|e| format!("bad seconds value: {e}"))?;
        let cores = match lines.next() {
            Some(line) => Some(
                line.parse::<usize>()
                    .map_err(|e| format!("bad core count: {e}"))?,
            ),
            None => None,
        };
        Ok(Self { seconds, cores })
    }
}

/// Speedup and efficiency of a parallel run against a sequential one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speedup {
    pub sequential_seconds: f64,
    pub parallel_seconds:   f64,
    pub cores:              usize,
    pub speedup:            f64,
    pub efficiency:         f64,
}

impl Speedup {
    pub fn compute(sequential_seconds: f64, parallel_seconds: f64, cores: usize) -> Self {
        let speedup = sequential_seconds / parallel_seconds;
        Self {
            sequential_seconds,
            parallel_seconds,
            cores,
            speedup,
            efficiency: speedup / cores as f64,
        }
    }

    pub fn between(sequential: &ExecutionTime, parallel: &ExecutionTime) -> Self {
        Self::compute(sequential.seconds, parallel.seconds, parallel.core_count())
    }

    pub fn efficiency_percent(&self) -> f64 {
        self.efficiency * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_scaling_on_four_cores() {
        let s = Speedup::compute(100.0, 25.0, 4);
        assert_eq!(format!("{:.2}", s.speedup), "4.00");
        assert_eq!(format!("{:.1}%", s.efficiency_percent()), "100.0%");
    }

    #[test]
    fn half_efficiency_on_four_cores() {
        let s = Speedup::compute(100.0, 50.0, 4);
        assert_eq!(format!("{:.2}", s.speedup), "2.00");
        assert_eq!(format!("{:.1}%", s.efficiency_percent()), "50.0%");
    }

    #[test]
    fn missing_core_line_defaults_to_one() {
        let t = ExecutionTime::parse("12.5\n").unwrap();
        assert_eq!(t.cores, None);
        assert_eq!(t.core_count(), 1);
    }

    #[test]
    fn parallel_contents_have_two_lines() {
        let t = ExecutionTime::parallel(3.14159, 8);
        assert_eq!(t.to_file_contents(), "3.1416\n8");
        assert_eq!(ExecutionTime::parse(&t.to_file_contents()).unwrap().core_count(), 8);
    }

    #[test]
    fn garbage_seconds_is_an_error() {
        assert!(ExecutionTime::parse("fast\n4").is_err());
        assert!(ExecutionTime::parse("").is_err());
    }
}

//! Per-day statistics: accumulation and the statistics CSV.
//!
//! File format (header is exact):
//!   Day,Susceptible,Infected,Recovered,Dead,R0
//! One row per simulated day, Day strictly increasing by 1 from 0,
//! R0 written with 4 decimals.

use crate::{
    error::{SimError, SimResult},
    grid::StateCounts,
    r0::R0Estimator,
    types::Day,
};
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};

pub const STATS_HEADER: [&str; 6] = ["Day", "Susceptible", "Infected", "Recovered", "Dead", "R0"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(rename = "Day")]
    pub day:         Day,
    #[serde(rename = "Susceptible")]
    pub susceptible: u64,
    #[serde(rename = "Infected")]
    pub infected:    u64,
    #[serde(rename = "Recovered")]
    pub recovered:   u64,
    #[serde(rename = "Dead")]
    pub dead:        u64,
    #[serde(rename = "R0")]
    pub r0:          f64,
}

impl DayRecord {
    pub fn counts(&self) -> StateCounts {
        StateCounts {
            susceptible: self.susceptible,
            infected:    self.infected,
            recovered:   self.recovered,
            dead:        self.dead,
        }
    }

    pub fn population(&self) -> u64 {
        self.counts().total()
    }

    fn to_row(&self) -> [String; 6] {
        [
            self.day.to_string(),
            self.susceptible.to_string(),
            self.infected.to_string(),
            self.recovered.to_string(),
            self.dead.to_string(),
            format!("{:.4}", self.r0),
        ]
    }
}

/// Builds the Day record sequence of one run.
pub struct StatisticsAccumulator {
    estimator: Box<dyn R0Estimator>,
    history:   Vec<DayRecord>,
}

impl StatisticsAccumulator {
    pub fn new(estimator: Box<dyn R0Estimator>) -> Self {
        Self { estimator, history: Vec::new() }
    }

    pub fn estimator_name(&self) -> &'static str {
        self.estimator.name()
    }

    /// Append the record for `day`. Days must arrive in order starting at 0
    /// and the population must match every earlier day.
    pub fn record_day(&mut self, day: Day, counts: StateCounts) -> SimResult<&DayRecord> {
        let expected_day = self.history.last().map(|r| r.day + 1).unwrap_or(0);
        if day != expected_day {
            return Err(SimError::DayMismatch { expected: expected_day, actual: day });
        }
        if let Some(first) = self.history.first() {
            if counts.total() != first.population() {
                return Err(SimError::PopulationMismatch {
                    day,
                    expected: first.population(),
                    actual:   counts.total(),
                });
            }
        }

        let r0 = self.estimator.estimate(day, &counts, &self.history);
        self.history.push(DayRecord {
            day,
            susceptible: counts.susceptible,
            infected:    counts.infected,
            recovered:   counts.recovered,
            dead:        counts.dead,
            r0,
        });
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn history(&self) -> &[DayRecord] {
        &self.history
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.history.last()
    }
}

/// Streaming statistics CSV writer. Every row is flushed as it is
/// appended, so an interrupted run still leaves a valid prefix.
pub struct StatsWriter {
    writer: csv::Writer<File>,
}

impl StatsWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(STATS_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, record: &DayRecord) -> SimResult<()> {
        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Read a statistics CSV. No schema pre-checks: a missing column or a
/// non-numeric cell surfaces as a CSV error.
pub fn read_csv<P: AsRef<Path>>(path: P) -> SimResult<Vec<DayRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: DayRecord = result?;
        records.push(record);
    }
    Ok(records)
}

/// Population conservation: every row sums to the first row's total.
pub fn check_conservation(records: &[DayRecord]) -> SimResult<()> {
    let Some(first) = records.first() else { return Ok(()) };
    let expected = first.population();
    for record in records {
        if record.population() != expected {
            return Err(SimError::PopulationMismatch {
                day: record.day,
                expected,
                actual: record.population(),
            });
        }
    }
    Ok(())
}

/// Dead and Recovered never decrease, Susceptible never increases.
pub fn is_monotonic(records: &[DayRecord]) -> bool {
    records.windows(2).all(|w| {
        w[1].dead >= w[0].dead
            && w[1].recovered >= w[0].recovered
            && w[1].susceptible <= w[0].susceptible
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r0::CumulativeRatio;

    fn counts(s: u64, i: u64, r: u64, d: u64) -> StateCounts {
        StateCounts { susceptible: s, infected: i, recovered: r, dead: d }
    }

    #[test]
    fn accumulator_rejects_skipped_days() {
        let mut acc = StatisticsAccumulator::new(Box::new(CumulativeRatio::new(1)));
        acc.record_day(0, counts(9, 1, 0, 0)).unwrap();
        let err = acc.record_day(2, counts(9, 1, 0, 0)).unwrap_err();
        assert!(matches!(err, SimError::DayMismatch { expected: 1, actual: 2 }));
    }

    #[test]
    fn accumulator_rejects_population_drift() {
        let mut acc = StatisticsAccumulator::new(Box::new(CumulativeRatio::new(1)));
        acc.record_day(0, counts(9, 1, 0, 0)).unwrap();
        let err = acc.record_day(1, counts(9, 2, 0, 0)).unwrap_err();
        assert!(matches!(err, SimError::PopulationMismatch { day: 1, expected: 10, actual: 11 }));
    }

    #[test]
    fn rows_format_r0_with_four_decimals() {
        let record = DayRecord {
            day: 3, susceptible: 1, infected: 2, recovered: 3, dead: 4, r0: 1.0 / 3.0,
        };
        assert_eq!(record.to_row()[5], "0.3333");
    }

    #[test]
    fn monotonic_check_flags_recovered_drop() {
        let a = DayRecord { day: 0, susceptible: 5, infected: 2, recovered: 3, dead: 0, r0: 0.0 };
        let b = DayRecord { day: 1, susceptible: 5, infected: 3, recovered: 2, dead: 0, r0: 0.0 };
        assert!(!is_monotonic(&[a, b]));
    }
}

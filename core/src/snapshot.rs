//! Grid snapshots: one CSV matrix per emitted day.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL days, starting at day 0,
//! so frame i is always day i × SNAPSHOT_INTERVAL.
//!
//! Ordering comes from `index.csv` (Frame,Day,File) written next to the
//! snapshot files. File names are zero-padded so a plain lexicographic
//! sort also works, and directories without an index fall back to the
//! day number parsed from each name.

use crate::{
    error::{SimError, SimResult},
    grid::{CellState, Grid},
    types::Day,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const SNAPSHOT_INTERVAL: Day = 30; // monthly
pub const INDEX_FILE: &str = "index.csv";

const FILE_PREFIX: &str = "grid_day_";
const FILE_SUFFIX: &str = ".csv";

/// Simulated day shown by animation frame `frame`.
pub fn frame_day(frame: usize) -> Day {
    frame as Day * SNAPSHOT_INTERVAL
}

pub fn is_snapshot_day(day: Day) -> bool {
    day.is_multiple_of(SNAPSHOT_INTERVAL)
}

pub fn snapshot_file_name(day: Day) -> String {
    format!("{FILE_PREFIX}{day:04}{FILE_SUFFIX}")
}

/// Day number encoded in a snapshot file name, if it is one.
pub fn parse_snapshot_day(file_name: &str) -> Option<Day> {
    file_name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?
        .parse()
        .ok()
}

pub fn write_snapshot(path: &Path, grid: &Grid) -> SimResult<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for row in 0..grid.rows() {
        writer.write_record(grid.row(row).iter().map(|c| c.code().to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> SimResult<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let mut cells = Vec::with_capacity(record.len());
        for (col, field) in record.iter().enumerate() {
            let state = field
                .parse::<u8>()
                .ok()
                .and_then(CellState::from_code)
                .ok_or_else(|| SimError::InvalidCell { code: field.to_string(), row, col })?;
            cells.push(state);
        }
        rows.push(cells);
    }
    if rows.is_empty() {
        return Err(SimError::MalformedSnapshot {
            path:   path.display().to_string(),
            reason: "no rows".into(),
        });
    }
    Grid::from_rows(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "Frame")]
    pub frame: usize,
    #[serde(rename = "Day")]
    pub day:   Day,
    #[serde(rename = "File")]
    pub file:  String,
}

/// Explicit frame → day → file mapping for one snapshot directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotIndex {
    entries: Vec<IndexEntry>,
}

impl SnapshotIndex {
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, day: Day, file: String) {
        let frame = self.entries.len();
        self.entries.push(IndexEntry { frame, day, file });
    }

    pub fn save(&self, dir: &Path) -> SimResult<()> {
        let mut writer = csv::Writer::from_path(dir.join(INDEX_FILE))?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load(dir: &Path) -> SimResult<Self> {
        let mut reader = csv::Reader::from_path(dir.join(INDEX_FILE))?;
        let mut entries: Vec<IndexEntry> = Vec::new();
        for result in reader.deserialize() {
            entries.push(result?);
        }
        entries.sort_by_key(|e| e.frame);
        Ok(Self { entries })
    }

    /// Rebuild an index from file names alone, ordered by parsed day.
    pub fn scan(dir: &Path) -> SimResult<Self> {
        let mut found: Vec<(Day, String)> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(day) = parse_snapshot_day(&name) {
                found.push((day, name));
            }
        }
        found.sort_by_key(|(day, _)| *day);
        let mut index = Self::default();
        for (day, file) in found {
            index.push(day, file);
        }
        Ok(index)
    }

    /// Prefer the written index; fall back to scanning file names.
    pub fn discover(dir: &Path) -> SimResult<Self> {
        if dir.join(INDEX_FILE).is_file() {
            Self::load(dir)
        } else {
            log::debug!("No {INDEX_FILE} in {}, scanning file names", dir.display());
            Self::scan(dir)
        }
    }
}

/// Writes snapshot files for one run and keeps the index current.
pub struct SnapshotRecorder {
    dir:   PathBuf,
    index: SnapshotIndex,
}

impl SnapshotRecorder {
    pub fn create<P: Into<PathBuf>>(dir: P) -> SimResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, index: SnapshotIndex::default() })
    }

    pub fn record(&mut self, grid: &Grid, day: Day) -> SimResult<PathBuf> {
        let file = snapshot_file_name(day);
        let path = self.dir.join(&file);
        write_snapshot(&path, grid)?;
        self.index.push(day, file);
        self.index.save(&self.dir)?;
        log::debug!("Snapshot saved at day {day}: {}", path.display());
        Ok(path)
    }
}

/// A loaded snapshot sequence, in frame order.
#[derive(Debug, Clone)]
pub struct SnapshotSequence {
    frames: Vec<(Day, Grid)>,
}

impl SnapshotSequence {
    pub fn load(dir: &Path) -> SimResult<Self> {
        let index = SnapshotIndex::discover(dir)?;
        let mut frames = Vec::with_capacity(index.len());
        for entry in index.entries() {
            frames.push((entry.day, read_snapshot(&dir.join(&entry.file))?));
        }
        log::info!("Loaded {} snapshots from {}", frames.len(), dir.display());
        Ok(Self { frames })
    }

    pub fn from_frames(frames: Vec<(Day, Grid)>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn day_of_frame(&self, frame: usize) -> Option<Day> {
        self.frames.get(frame).map(|(day, _)| *day)
    }

    pub fn grid(&self, frame: usize) -> Option<&Grid> {
        self.frames.get(frame).map(|(_, grid)| grid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &Grid)> {
        self.frames.iter().map(|(day, grid)| (*day, grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_sort_in_day_order() {
        let mut names: Vec<String> = [0, 30, 60, 90, 120, 300, 990, 1020]
            .iter()
            .map(|d| snapshot_file_name(*d))
            .collect();
        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn day_parses_back_from_file_name() {
        assert_eq!(parse_snapshot_day(&snapshot_file_name(60)), Some(60));
        assert_eq!(parse_snapshot_day("grid_day_030.csv"), Some(30));
        assert_eq!(parse_snapshot_day("statistics.csv"), None);
    }

    #[test]
    fn frames_map_to_thirty_day_steps() {
        assert_eq!(frame_day(0), 0);
        assert_eq!(frame_day(1), 30);
        assert_eq!(frame_day(12), 360);
        assert!(is_snapshot_day(0) && is_snapshot_day(90) && !is_snapshot_day(45));
    }
}

//! Run manifest: the run.json written next to a run's output files.
//!
//! Pairs the statistics series, snapshot directory and timing file of
//! one engine invocation with the parameters that produced them.

use crate::{
    config::SimConfig,
    error::SimResult,
    types::{Day, RunId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use uuid::Uuid;

pub fn new_run_id() -> RunId {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Reached the configured horizon.
    Horizon,
    /// No infected cell left; nothing can change any more.
    NoInfected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id:          RunId,
    pub engine:          String,
    pub workers:         usize,
    pub r0_estimator:    String,
    pub started_at:      DateTime<Utc>,
    pub days_simulated:  Day,
    pub stop_reason:     StopReason,
    pub elapsed_seconds: f64,
    pub config:          SimConfig,
}

impl RunManifest {
    pub fn save(&self, path: &Path) -> SimResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Two runs are comparable day by day only when they simulated the
    /// same number of days from the same starting conditions.
    pub fn comparable_with(&self, other: &RunManifest) -> bool {
        self.days_simulated == other.days_simulated
            && self.config.seed == other.config.seed
            && self.config.grid_size == other.config.grid_size
            && self.config.initial_infected == other.config.initial_infected
            && self.config.model == other.config.model
    }
}

use crate::{
    error::{SimError, SimResult},
    types::Day,
};
use serde::{Deserialize, Serialize};

/// Days between two console progress lines.
pub const PROGRESS_INTERVAL: Day = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Per-neighbour chance that an infected cell infects a susceptible one.
    pub infection_prob: f64,
    /// Daily chance that an infected cell recovers (checked after death).
    pub recovery_prob:  f64,
    /// Daily chance that an infected cell dies.
    pub death_prob:     f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid_size:         usize,
    pub days:              Day,
    pub initial_infected:  usize,
    pub seed:              u64,
    pub model:             ModelConfig,
    /// Days between console progress lines.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Day,
}

fn default_progress_interval() -> Day { PROGRESS_INTERVAL }

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size:        1000,
            days:             365,
            initial_infected: 10,
            seed:             42,
            model: ModelConfig {
                infection_prob: 0.3,
                recovery_prob:  0.1,
                death_prob:     0.01,
            },
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file, e.g. data/sim_config.json.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Small enough that a full run takes milliseconds.
    pub fn default_test() -> Self {
        Self {
            grid_size:        40,
            days:             120,
            initial_infected: 3,
            seed:             42,
            ..Self::default()
        }
    }

    pub fn total_cells(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.grid_size == 0 {
            return Err(SimError::InvalidConfig("grid_size must be > 0".into()));
        }
        if self.initial_infected > self.total_cells() {
            return Err(SimError::InvalidConfig(format!(
                "initial_infected ({}) exceeds cell count ({})",
                self.initial_infected,
                self.total_cells()
            )));
        }
        if self.progress_interval == 0 {
            return Err(SimError::InvalidConfig("progress_interval must be > 0".into()));
        }
        let probabilities = [
            ("infection_prob", self.model.infection_prob),
            ("recovery_prob", self.model.recovery_prob),
            ("death_prob", self.model.death_prob),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!("{name} = {p} is outside [0, 1]")));
            }
        }
        Ok(())
    }
}

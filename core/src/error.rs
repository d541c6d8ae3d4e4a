use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Day recorded out of order: expected {expected}, got {actual}")]
    DayMismatch { expected: u64, actual: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid cell code {code} at row {row}, column {col}")]
    InvalidCell { code: String, row: usize, col: usize },

    #[error("Grid is not rectangular: row {row} has {actual} cells, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, actual: usize },

    #[error("Malformed snapshot '{path}': {reason}")]
    MalformedSnapshot { path: String, reason: String },

    #[error("Malformed timing file '{path}': {reason}")]
    MalformedTiming { path: String, reason: String },

    #[error("Statistics for {label} have no rows")]
    EmptyStatistics { label: String },

    #[error("Population not conserved at day {day}: expected {expected}, got {actual}")]
    PopulationMismatch { day: u64, expected: u64, actual: u64 },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

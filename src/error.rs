use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker codec: {0}")]
    Codec(#[from] bincode::Error),

    #[error("Thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Dataset not found: {}", .0.display())]
    MissingDataset(PathBuf),

    #[error("Column `{0}` has no values")]
    EmptyColumn(&'static str),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Strategy `{strategy}` diverged from sequential output at index {index}")]
    OutputMismatch { strategy: &'static str, index: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Resource sampler: {0}")]
    Sampler(String),

    #[error("Logging setup: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;

use clap::ValueEnum;

pub mod dataset;
pub mod error;
pub mod harness;
pub mod logging;
pub mod report;
pub mod runner;
pub mod schema;
pub mod worker;

pub use error::{BenchError, Result};

/// Scenario categories to run.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum ScenarioSet {
    /// Every category: CSV read, statistics, parallel transform, I/O-bound.
    #[default]
    All,
    /// Full CSV parse of every dataset.
    CsvRead,
    /// Descriptive statistics over the value column.
    Stats,
    /// Sequential vs thread-pool vs process-pool transform.
    Parallel,
    /// Sleep-based I/O-bound simulation.
    Io,
}

impl ScenarioSet {
    pub fn includes(&self, other: ScenarioSet) -> bool {
        *self == ScenarioSet::All || *self == other
    }
}

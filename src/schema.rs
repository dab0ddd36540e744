use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetDescriptor;

pub const SCHEMA_VERSION: u32 = 1;

pub const CSV_READING_PREFIX: &str = "csv_reading_";
pub const CALCULATIONS_PREFIX: &str = "calculations_";
pub const PARALLEL_PREFIX: &str = "parallel_";
pub const IO_PREFIX: &str = "io_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub runtime: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub runtime: String,
    pub runtime_version: String,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub host_name: Option<String>,
    /// Physical cores; not every platform reports it.
    pub cpu_count: Option<usize>,
    pub cpu_count_logical: usize,
    pub memory_total_gb: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub memory_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub scenario_key: String,
    pub category: String,
    pub method: String,

    pub duration_seconds: f64,
    pub rows: Option<u64>,
    pub rows_per_second: Option<f64>,

    pub memory_delta_mb: f64,
    pub cpu_percent: f64,

    pub dataset: Option<DatasetDescriptor>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_tests: usize,
    pub csv_reading_tests: usize,
    pub calculation_tests: usize,
    pub parallel_tests: usize,
    pub io_tests: usize,
}

impl Summary {
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Self {
        let mut summary = Summary::default();
        for key in keys {
            summary.total_tests += 1;
            if key.starts_with(CSV_READING_PREFIX) {
                summary.csv_reading_tests += 1;
            } else if key.starts_with(CALCULATIONS_PREFIX) {
                summary.calculation_tests += 1;
            } else if key.starts_with(PARALLEL_PREFIX) {
                summary.parallel_tests += 1;
            } else if key.starts_with(IO_PREFIX) {
                summary.io_tests += 1;
            }
        }
        summary
    }
}

/// Everything one full benchmark run produced.
///
/// `summary` is kept in step with `results` on every insert, so a
/// serialized report always satisfies `summary.total_tests == results.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run: RunMeta,
    pub system_info: SystemInfo,
    pub results: BTreeMap<String, BenchmarkRecord>,
    pub summary: Summary,
}

impl RunReport {
    pub fn new(run: RunMeta, system_info: SystemInfo) -> Self {
        Self {
            run,
            system_info,
            results: BTreeMap::new(),
            summary: Summary::default(),
        }
    }

    /// Inserts a record under its scenario key; a colliding key is replaced
    /// and the previous record returned.
    pub fn insert(&mut self, record: BenchmarkRecord) -> Option<BenchmarkRecord> {
        let prev = self.results.insert(record.scenario_key.clone(), record);
        self.summary = Summary::from_keys(self.results.keys());
        prev
    }

    pub fn by_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a BenchmarkRecord)> + 'a {
        self.results
            .iter()
            .filter(move |(k, _)| k.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(key: &str, secs: f64) -> BenchmarkRecord {
        BenchmarkRecord {
            scenario_key: key.to_string(),
            category: "test".to_string(),
            method: "test".to_string(),
            duration_seconds: secs,
            rows: None,
            rows_per_second: None,
            memory_delta_mb: 0.0,
            cpu_percent: 0.0,
            dataset: None,
            metadata: json!({}),
        }
    }

    fn empty_report() -> RunReport {
        RunReport::new(
            RunMeta {
                schema_version: SCHEMA_VERSION,
                bench_version: "test".to_string(),
                runtime: "rust".to_string(),
                profile: "quick".to_string(),
                seed: 0,
                timestamp_utc: "now".to_string(),
                git_sha: None,
            },
            SystemInfo {
                runtime: "rust".to_string(),
                runtime_version: "test".to_string(),
                os_name: None,
                os_version: None,
                host_name: None,
                cpu_count: None,
                cpu_count_logical: 1,
                memory_total_gb: 1.0,
                timestamp: "now".to_string(),
            },
        )
    }

    #[test]
    fn test_summary_counts_by_prefix() {
        let mut report = empty_report();
        for key in [
            "csv_reading_small",
            "csv_reading_medium",
            "calculations_small",
            "parallel_sequential_medium",
            "parallel_threads_medium",
            "io_threads",
        ] {
            report.insert(record(key, 1.0));
        }

        assert_eq!(
            report.summary,
            Summary {
                total_tests: 6,
                csv_reading_tests: 2,
                calculation_tests: 1,
                parallel_tests: 2,
                io_tests: 1,
            }
        );
        assert_eq!(report.by_prefix(PARALLEL_PREFIX).count(), 2);
    }

    #[test]
    fn test_insert_last_write_wins() {
        let mut report = empty_report();
        assert!(report.insert(record("io_threads", 1.0)).is_none());
        let prev = report.insert(record("io_threads", 2.0)).unwrap();

        assert_eq!(prev.duration_seconds, 1.0);
        assert_eq!(report.results["io_threads"].duration_seconds, 2.0);
        assert_eq!(report.summary.total_tests, 1);
    }
}

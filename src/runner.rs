use log::{info, warn};

use crate::benches::{csv_read, io_bound, stats, transform};
use crate::dataset::{self, load_table, DatasetDescriptor, GenerateConfig};
use crate::error::{BenchError, Result};
use crate::harness::{self, BenchConfig, ResourceSampler};
use crate::schema::{
    BenchmarkRecord, RunMeta, RunReport, CALCULATIONS_PREFIX, CSV_READING_PREFIX, SCHEMA_VERSION,
};
use crate::ScenarioSet;

pub fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

pub fn run_meta(cfg: &BenchConfig) -> RunMeta {
    RunMeta {
        schema_version: SCHEMA_VERSION,
        bench_version: env!("CARGO_PKG_VERSION").to_string(),
        runtime: cfg.runtime.clone(),
        profile: cfg.profile.as_str().to_string(),
        seed: cfg.seed,
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        git_sha: git_sha_short(),
    }
}

/// Generate every catalogue entry. A dataset that cannot be written is
/// logged and left out; scenarios that need it are then skipped.
pub fn generate_datasets(cfg: &BenchConfig) -> Vec<DatasetDescriptor> {
    let mut out = Vec::with_capacity(cfg.datasets.len());
    for (i, spec) in cfg.datasets.iter().enumerate() {
        let gen_cfg = GenerateConfig {
            value_min: cfg.value_min,
            value_max: cfg.value_max,
            seed: dataset::per_dataset_seed(cfg.seed, i),
        };
        match dataset::generate_dataset(&cfg.data_dir, spec, &gen_cfg) {
            Ok(desc) => out.push(desc),
            Err(e) => warn!("could not generate dataset {}: {e}", spec.name),
        }
    }
    out
}

/// Insert a finished record, or log why the scenario produced none.
fn settle(report: &mut RunReport, key: &str, outcome: Result<BenchmarkRecord>) {
    match outcome {
        Ok(record) => {
            report.insert(record);
        }
        Err(BenchError::MissingDataset(path)) => {
            warn!("skipping {key}: {} not found", path.display());
        }
        Err(e) => warn!("scenario {key} failed: {e}"),
    }
}

/// Generate datasets, run the selected scenario categories and return the
/// aggregated report. Only sampler setup can fail the whole run here;
/// scenario failures are logged and their records left out.
pub fn run_suite(cfg: &BenchConfig) -> Result<RunReport> {
    let mut report = RunReport::new(run_meta(cfg), harness::system_info(&cfg.runtime));
    let mut sampler = ResourceSampler::new()?;

    info!("generating {} datasets in {}", cfg.datasets.len(), cfg.data_dir.display());
    let datasets = generate_datasets(cfg);

    if cfg.scenarios.includes(ScenarioSet::CsvRead) {
        for d in &datasets {
            let key = format!("{CSV_READING_PREFIX}{}", d.name);
            settle(&mut report, &key, csv_read::run(&mut sampler, d));
        }
    }

    if cfg.scenarios.includes(ScenarioSet::Stats) {
        for d in &datasets {
            let key = format!("{CALCULATIONS_PREFIX}{}", d.name);
            settle(&mut report, &key, stats::run(&mut sampler, d));
        }
    }

    if cfg.scenarios.includes(ScenarioSet::Parallel) {
        for name in &cfg.transform.datasets {
            let Some(d) = datasets.iter().find(|d| &d.name == name) else {
                warn!("skipping parallel transform: dataset {name} not generated");
                continue;
            };
            let table = match load_table(&d.filepath) {
                Ok(t) => t,
                Err(e) => {
                    warn!("skipping parallel transform on {name}: {e}");
                    continue;
                }
            };
            for (key, outcome) in transform::run(cfg, &mut sampler, d, &table) {
                settle(&mut report, &key, outcome);
            }
        }
    }

    if cfg.scenarios.includes(ScenarioSet::Io) {
        let mut rng = cfg.rng();
        for (key, outcome) in io_bound::run(&cfg.io, &mut sampler, &mut rng) {
            settle(&mut report, &key, outcome);
        }
    }

    info!("run complete: {} records", report.summary.total_tests);
    Ok(report)
}

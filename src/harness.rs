use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::debug;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sysinfo::{Pid, ProcessExt, System, SystemExt};

use crate::dataset::DatasetSpec;
use crate::error::{BenchError, Result};
use crate::schema::{ResourceSnapshot, SystemInfo};
use crate::worker::WorkerCommand;
use crate::ScenarioSet;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }

    /// Dataset catalogue used when the caller does not inject one.
    pub fn datasets(&self) -> Vec<DatasetSpec> {
        let mut out = vec![
            DatasetSpec::new("small", 1_000, "dataset_1k.csv"),
            DatasetSpec::new("medium", 10_000, "dataset_10k.csv"),
        ];
        if *self == Profile::Full {
            out.push(DatasetSpec::new("large", 100_000, "dataset_100k.csv"));
            out.push(DatasetSpec::new("xlarge", 500_000, "dataset_500k.csv"));
        }
        out
    }
}

/// Settings for the CPU-bound parallel transform scenario.
#[derive(Clone, Debug)]
pub struct TransformConfig {
    pub thread_workers: usize,
    pub process_workers: usize,
    /// Dataset names the transform runs against.
    pub datasets: Vec<String>,
    /// Command that starts a process-pool worker. `None` disables the
    /// process strategy.
    pub worker: Option<WorkerCommand>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            thread_workers: 4,
            process_workers: 2,
            datasets: vec!["medium".to_string()],
            worker: None,
        }
    }
}

/// Settings for the I/O-bound sleep simulation.
#[derive(Clone, Debug)]
pub struct IoConfig {
    pub tasks: usize,
    pub workers: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            tasks: 8,
            workers: 4,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
    /// Label stamped into the report and its filename.
    pub runtime: String,
    pub data_dir: PathBuf,
    pub datasets: Vec<DatasetSpec>,
    pub value_min: i64,
    pub value_max: i64,
    pub scenarios: ScenarioSet,
    pub transform: TransformConfig,
    pub io: IoConfig,
}

impl BenchConfig {
    pub fn new(profile: Profile, seed: u64, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile,
            seed,
            runtime: "rust".to_string(),
            data_dir: data_dir.into(),
            datasets: profile.datasets(),
            value_min: 50,
            value_max: 5_000,
            scenarios: ScenarioSet::All,
            transform: TransformConfig::default(),
            io: IoConfig::default(),
        }
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

/// Point-in-time CPU/memory readings for the current process.
///
/// CPU percent comes straight from the OS accounting for the interval since
/// the previous refresh. It is indicative only: it is never differenced, and
/// a single reading around a short region says little about real load.
pub struct ResourceSampler {
    system: System,
    pid: Pid,
}

impl ResourceSampler {
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid().map_err(|e| BenchError::Sampler(e.to_string()))?;
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_process(pid);
        Ok(Self { system, pid })
    }

    pub fn sample(&mut self) -> ResourceSnapshot {
        self.system.refresh_process(self.pid);
        let (rss, cpu) = self
            .system
            .process(self.pid)
            .map(|p| (p.memory(), p.cpu_usage()))
            .unwrap_or((0, 0.0));

        let total = self.system.total_memory();
        let memory_percent = if total == 0 {
            0.0
        } else {
            rss as f64 / total as f64 * 100.0
        };

        ResourceSnapshot {
            cpu_percent: cpu as f64,
            memory_mb: rss as f64 / BYTES_PER_MB,
            memory_percent,
        }
    }
}

/// Outcome of [`time_op`]: the operation's value plus its measurements.
#[derive(Clone, Debug)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
    pub before: ResourceSnapshot,
    pub after: ResourceSnapshot,
}

impl<T> Timed<T> {
    pub fn duration_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn memory_delta_mb(&self) -> f64 {
        self.after.memory_mb - self.before.memory_mb
    }

    /// `count / elapsed`, or `None` when the clock did not advance.
    pub fn per_second(&self, count: usize) -> Option<f64> {
        let secs = self.duration_seconds();
        if secs <= 0.0 {
            None
        } else {
            Some(count as f64 / secs)
        }
    }
}

/// Runs `op` between two resource snapshots and measures its wall-clock
/// duration. Errors from `op` are handed back untouched.
pub fn time_op<T, E>(
    sampler: &mut ResourceSampler,
    op: impl FnOnce() -> std::result::Result<T, E>,
) -> std::result::Result<Timed<T>, E> {
    let before = sampler.sample();
    let start = Instant::now();
    let value = op()?;
    let elapsed = start.elapsed();
    let after = sampler.sample();

    debug!(
        "timed region: {:.6}s, rss {:.1} -> {:.1} MB",
        elapsed.as_secs_f64(),
        before.memory_mb,
        after.memory_mb
    );

    Ok(Timed {
        value,
        elapsed,
        before,
        after,
    })
}

pub fn system_info(runtime: &str) -> SystemInfo {
    let mut system = System::new();
    system.refresh_memory();
    system.refresh_cpu();

    let logical = match system.cpus().len() {
        0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    };

    SystemInfo {
        runtime: runtime.to_string(),
        runtime_version: env!("CARGO_PKG_VERSION").to_string(),
        os_name: system.name(),
        os_version: system.os_version(),
        host_name: system.host_name(),
        cpu_count: system.physical_core_count(),
        cpu_count_logical: logical,
        memory_total_gb: system.total_memory() as f64 / BYTES_PER_GB,
        timestamp: chrono::Local::now().to_rfc3339(),
    }
}

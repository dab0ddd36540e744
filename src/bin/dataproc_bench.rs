use clap::{Parser, Subcommand, ValueEnum};
use dataproc_bench::benches::stats;
use dataproc_bench::dataset::{self, DatasetSpec, GenerateConfig};
use dataproc_bench::harness::{BenchConfig, Profile};
use dataproc_bench::worker::{self, WorkerCommand};
use dataproc_bench::{logging, report, runner, BenchError, ScenarioSet};
use log::{info, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate datasets, run every scenario, persist the JSON report.
    Suite {
        /// Which scenario categories to run.
        #[arg(long, value_enum, default_value_t = ScenarioSet::All)]
        only: ScenarioSet,

        /// Thread-pool size for the parallel transform.
        #[arg(long, default_value_t = 4)]
        threads: usize,

        /// Process-pool size for the parallel transform.
        #[arg(long, default_value_t = 2)]
        processes: usize,

        /// Dataset(s) the parallel transform runs on. Can be repeated.
        #[arg(long = "parallel-dataset", value_name = "NAME", default_values_t = [String::from("medium")])]
        parallel_datasets: Vec<String>,

        #[arg(long, default_value_t = 8)]
        io_tasks: usize,

        #[arg(long, default_value_t = 4)]
        io_workers: usize,

        /// Lower bound of the simulated I/O delay, in milliseconds.
        #[arg(long, default_value_t = 100)]
        io_min_ms: u64,

        /// Upper bound of the simulated I/O delay, in milliseconds.
        #[arg(long, default_value_t = 300)]
        io_max_ms: u64,
    },

    /// Generate a single `id,value` dataset.
    Generate {
        /// Number of data rows (header excluded).
        #[arg(long, short = 'n', default_value_t = 10_000)]
        rows: u64,

        /// Output filename inside --data-dir.
        #[arg(long, default_value = "large_dataset.csv")]
        name: String,
    },

    /// Load a dataset and print its descriptive statistics as JSON.
    Stats {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Process-pool worker: one bincode job on stdin, one result on stdout.
    #[command(hide = true)]
    Worker,
}

#[derive(Parser, Debug)]
#[command(name = "dataproc-bench")]
#[command(about = "Data-processing throughput benchmark runner (JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    #[arg(long, default_value = "results", global = true)]
    results_dir: PathBuf,

    /// Where to write the JSON report. Defaults to a timestamped file in
    /// --results-dir.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[arg(long, default_value_t = LevelFilter::Info, global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    cmd: Command,
}

fn main() -> Result<(), BenchError> {
    let args = Args::parse();

    // Workers stay silent: stdout carries the protocol.
    if !matches!(args.cmd, Command::Worker) {
        logging::init(args.log_level)?;
    }
    let profile: Profile = args.profile.into();

    match args.cmd {
        Command::Suite {
            only,
            threads,
            processes,
            parallel_datasets,
            io_tasks,
            io_workers,
            io_min_ms,
            io_max_ms,
        } => {
            let mut cfg = BenchConfig::new(profile, args.seed, &args.data_dir);
            cfg.scenarios = only;
            cfg.transform.thread_workers = threads;
            cfg.transform.process_workers = processes;
            cfg.transform.datasets = parallel_datasets;
            cfg.transform.worker = Some(WorkerCommand::current_exe()?);
            cfg.io.tasks = io_tasks;
            cfg.io.workers = io_workers;
            cfg.io.min_delay = Duration::from_millis(io_min_ms);
            cfg.io.max_delay = Duration::from_millis(io_max_ms);

            let run = runner::run_suite(&cfg)?;

            let path = match &args.out {
                Some(out) => {
                    report::write_to(&run, out)?;
                    out.clone()
                }
                None => report::save(&run, &args.results_dir)?,
            };

            println!("{}", report::render(&run));
            println!("Report saved: {}", path.display());
        }
        Command::Generate { rows, name } => {
            let spec = DatasetSpec::new("custom", rows, name);
            let gen_cfg = GenerateConfig {
                seed: args.seed,
                ..Default::default()
            };
            let start = std::time::Instant::now();
            let desc = dataset::generate_dataset(&args.data_dir, &spec, &gen_cfg)?;
            info!("generated in {:.2}s", start.elapsed().as_secs_f64());

            println!("{}", serde_json::to_string_pretty(&desc)?);
        }
        Command::Stats { path } => {
            let table = dataset::load_table(&path)?;
            let s = stats::compute(&table.values)?;
            println!("{}", serde_json::to_string_pretty(&s)?);
        }
        Command::Worker => {
            worker::serve(io::stdin().lock(), io::stdout().lock())?;
        }
    }

    Ok(())
}

//! Persisting and printing a [`RunReport`].

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::schema::{
    RunReport, CALCULATIONS_PREFIX, CSV_READING_PREFIX, IO_PREFIX, PARALLEL_PREFIX,
};

/// `<runtime>_benchmark_results_<YYYYmmdd_HHMMSS>.json`
pub fn report_filename(runtime: &str, at: chrono::DateTime<chrono::Local>) -> String {
    format!(
        "{runtime}_benchmark_results_{}.json",
        at.format("%Y%m%d_%H%M%S")
    )
}

pub fn write_to(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!("report written to {}", path.display());
    Ok(())
}

/// Write `report` into `dir` under a timestamped name and return the path.
pub fn save(report: &RunReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(report_filename(&report.run.runtime, chrono::Local::now()));
    write_to(report, &path)?;
    Ok(path)
}

pub fn load(path: &Path) -> Result<RunReport> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn rule(out: &mut String, width: usize) {
    let _ = writeln!(out, "{}", "-".repeat(width));
}

/// Human-readable tables for the console. The layout is not a stable
/// interface; use the JSON artifact for anything machine-read.
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();
    let sys = &report.system_info;

    let _ = writeln!(out, "SYSTEM");
    let _ = writeln!(
        out,
        "  runtime: {} {} | cores: {} physical, {} logical | memory: {:.1} GB",
        sys.runtime,
        sys.runtime_version,
        sys.cpu_count.map_or_else(|| "?".to_string(), |n| n.to_string()),
        sys.cpu_count_logical,
        sys.memory_total_gb
    );
    if let (Some(os), Some(ver)) = (&sys.os_name, &sys.os_version) {
        let _ = writeln!(out, "  os: {os} {ver}");
    }
    let _ = writeln!(out, "  timestamp: {}", sys.timestamp);

    let csv: Vec<_> = report.by_prefix(CSV_READING_PREFIX).collect();
    if !csv.is_empty() {
        let _ = writeln!(out, "\nCSV READING");
        let _ = writeln!(
            out,
            "{:<15} {:>10} {:>12} {:>10} {:>16}",
            "dataset", "rows", "size (MB)", "time (s)", "rows/s"
        );
        rule(&mut out, 67);
        for (_, r) in csv {
            let _ = writeln!(
                out,
                "{:<15} {:>10} {:>12.2} {:>10.4} {:>16.0}",
                r.dataset.as_ref().map_or("-", |d| d.name.as_str()),
                r.rows.unwrap_or(0),
                r.dataset.as_ref().map_or(0.0, |d| d.size_mb),
                r.duration_seconds,
                r.rows_per_second.unwrap_or(0.0)
            );
        }
    }

    let calc: Vec<_> = report.by_prefix(CALCULATIONS_PREFIX).collect();
    if !calc.is_empty() {
        let _ = writeln!(out, "\nCALCULATIONS");
        let _ = writeln!(
            out,
            "{:<15} {:>10} {:>10} {:>16}",
            "dataset", "rows", "time (s)", "rows/s"
        );
        rule(&mut out, 54);
        for (_, r) in calc {
            let _ = writeln!(
                out,
                "{:<15} {:>10} {:>10.4} {:>16.0}",
                r.dataset.as_ref().map_or("-", |d| d.name.as_str()),
                r.rows.unwrap_or(0),
                r.duration_seconds,
                r.rows_per_second.unwrap_or(0.0)
            );
        }
    }

    let par: Vec<_> = report.by_prefix(PARALLEL_PREFIX).collect();
    if !par.is_empty() {
        let _ = writeln!(out, "\nPARALLEL TRANSFORM");
        let _ = writeln!(
            out,
            "{:<12} {:<10} {:>8} {:>10} {:>9}",
            "method", "dataset", "workers", "time (s)", "speedup"
        );
        rule(&mut out, 53);
        for (_, r) in par {
            let speedup = r.metadata["speedup_vs_sequential"]
                .as_f64()
                .map_or_else(|| "1.00x".to_string(), |s| format!("{s:.2}x"));
            let _ = writeln!(
                out,
                "{:<12} {:<10} {:>8} {:>10.4} {:>9}",
                r.method,
                r.dataset.as_ref().map_or("-", |d| d.name.as_str()),
                r.metadata["workers"].as_u64().unwrap_or(1),
                r.duration_seconds,
                speedup
            );
        }
    }

    let io: Vec<_> = report.by_prefix(IO_PREFIX).collect();
    if !io.is_empty() {
        let _ = writeln!(out, "\nI/O BOUND");
        let _ = writeln!(
            out,
            "{:<12} {:>6} {:>8} {:>10} {:>12}",
            "method", "tasks", "workers", "time (s)", "s/task"
        );
        rule(&mut out, 52);
        for (_, r) in io {
            let _ = writeln!(
                out,
                "{:<12} {:>6} {:>8} {:>10.4} {:>12.4}",
                r.method,
                r.metadata["num_tasks"].as_u64().unwrap_or(0),
                r.metadata["workers"].as_u64().unwrap_or(1),
                r.duration_seconds,
                r.metadata["avg_time_per_task"].as_f64().unwrap_or(0.0)
            );
        }
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "\nTOTAL: {} tests ({} csv, {} calculations, {} parallel, {} io)",
        s.total_tests, s.csv_reading_tests, s.calculation_tests, s.parallel_tests, s.io_tests
    );
    out
}

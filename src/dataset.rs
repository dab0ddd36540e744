//! Synthetic CSV datasets shared by every benchmark scenario.
//!
//! # File Format
//!
//! ```text
//! id,value
//! 1,2817
//! 2,93
//! ...
//! N,4410
//! ```
//!
//! Ids run from 1 to N in order. Values are drawn uniformly from an
//! inclusive range (50..=5000 by default) with a seeded `ChaCha8Rng`, so
//! the same seed always produces the same file.

use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

pub const HEADER: [&str; 2] = ["id", "value"];

/// One catalogue entry: which dataset to generate and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub name: String,
    pub rows: u64,
    pub filename: String,
}

impl DatasetSpec {
    pub fn new(name: impl Into<String>, rows: u64, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows,
            filename: filename.into(),
        }
    }
}

/// A dataset that exists on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub rows: u64,
    pub filename: String,
    pub filepath: PathBuf,
    pub size_bytes: u64,
    pub size_mb: f64,
}

impl DatasetDescriptor {
    pub fn exists(&self) -> bool {
        self.filepath.is_file()
    }
}

/// Value range and seed for dataset generation. The row count always comes
/// from the caller ([`DatasetSpec::rows`] for [`generate_dataset`]).
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub value_min: i64,
    pub value_max: i64,
    pub seed: u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            value_min: 50,
            value_max: 5_000,
            seed: 42,
        }
    }
}

/// Seed for the `index`-th dataset of a run, so datasets in one run differ
/// while staying reproducible.
pub fn per_dataset_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

/// Write header plus `rows` data rows to `writer`.
pub fn write_rows<W: Write>(writer: W, rows: u64, config: &GenerateConfig) -> Result<()> {
    if config.value_min > config.value_max {
        return Err(BenchError::InvalidConfig(format!(
            "value range {}..={} is empty",
            config.value_min, config.value_max
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for id in 1..=rows {
        let value = rng.gen_range(config.value_min..=config.value_max);
        wtr.write_record([id.to_string(), value.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Generate `spec` under `data_dir`, creating the directory if needed.
pub fn generate_dataset(
    data_dir: &Path,
    spec: &DatasetSpec,
    config: &GenerateConfig,
) -> Result<DatasetDescriptor> {
    fs::create_dir_all(data_dir)?;
    let filepath = data_dir.join(&spec.filename);

    debug!("writing {} rows to {}", spec.rows, filepath.display());
    let file = File::create(&filepath)?;
    write_rows(BufWriter::with_capacity(64 * 1024, file), spec.rows, config)?;

    let size_bytes = fs::metadata(&filepath)?.len();
    info!(
        "generated dataset {}: {} rows, {} bytes",
        spec.name, spec.rows, size_bytes
    );

    Ok(DatasetDescriptor {
        name: spec.name.clone(),
        rows: spec.rows,
        filename: spec.filename.clone(),
        filepath,
        size_bytes,
        size_mb: size_bytes as f64 / (1024.0 * 1024.0),
    })
}

#[derive(Debug, Deserialize)]
struct Row {
    id: i64,
    value: i64,
}

/// In-memory columns of a loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub ids: Vec<i64>,
    pub values: Vec<i64>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse a whole dataset file into memory.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(BenchError::MissingDataset(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::with_capacity(64 * 1024, file));

    let mut table = Table::default();
    for row in reader.deserialize::<Row>() {
        let row = row?;
        table.ids.push(row.id);
        table.values.push(row.value);
    }
    Ok(table)
}

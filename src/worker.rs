//! Process-pool plumbing for the parallel transform.
//!
//! Each worker is a child process running the `worker` subcommand of this
//! crate's binary. The parent writes one bincode-encoded [`ChunkJob`] to the
//! child's stdin and closes it; the child answers with one [`ChunkOutput`]
//! on stdout and exits 0. Children share no memory with the parent.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::benches::transform::process_chunk;
use crate::error::{BenchError, Result};

/// Subcommand name the binary dispatches to [`serve`].
pub const WORKER_SUBCOMMAND: &str = "worker";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkJob {
    pub chunk_id: u32,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOutput {
    pub chunk_id: u32,
    pub values: Vec<i64>,
    pub original_sum: i64,
    pub processed_sum: i64,
}

/// How to start one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Re-invoke the running executable as a worker.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?, [WORKER_SUBCOMMAND]))
    }

    fn spawn(&self) -> Result<Child> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        Ok(child)
    }
}

/// Child-side entry point: decode one job, transform it, encode the answer.
pub fn serve<R: Read, W: Write>(input: R, mut output: W) -> Result<()> {
    let job: ChunkJob = bincode::deserialize_from(input)?;
    let out = process_chunk(job.chunk_id, &job.values);
    bincode::serialize_into(&mut output, &out)?;
    output.flush()?;
    Ok(())
}

/// Run one job per child process and return the outputs in job order.
///
/// All children are started before any job is written, so they compute
/// concurrently. The call blocks until every child has exited, including
/// when one of them fails; the first failure is returned.
pub fn run_jobs(command: &WorkerCommand, jobs: Vec<ChunkJob>) -> Result<Vec<ChunkOutput>> {
    let mut children = Vec::with_capacity(jobs.len());
    for _ in &jobs {
        match command.spawn() {
            Ok(child) => children.push(child),
            Err(e) => {
                reap(children);
                return Err(e);
            }
        }
    }
    debug!("spawned {} worker processes", children.len());

    if let Err(e) = feed(&mut children, &jobs) {
        reap(children);
        return Err(e);
    }

    let mut outputs = Vec::with_capacity(jobs.len());
    let mut first_err = None;
    for (child, job) in children.into_iter().zip(&jobs) {
        match collect(child, job) {
            Ok(out) => outputs.push(out),
            Err(e) => {
                debug!("worker for chunk {} failed: {e}", job.chunk_id);
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(outputs),
    }
}

/// Drain one child's stdout, wait for it, then validate its answer. The
/// child is always waited on, whatever the read produced.
fn collect(mut child: Child, job: &ChunkJob) -> Result<ChunkOutput> {
    let mut stdout = Vec::new();
    let read = match child.stdout.take() {
        Some(mut pipe) => pipe.read_to_end(&mut stdout).map(drop),
        None => Err(std::io::Error::other("worker stdout not captured")),
    };
    let status = child.wait()?;
    read?;

    if !status.success() {
        return Err(BenchError::Worker(format!(
            "worker for chunk {} exited with {status}",
            job.chunk_id
        )));
    }
    let out: ChunkOutput = bincode::deserialize(&stdout)?;
    if out.chunk_id != job.chunk_id || out.values.len() != job.values.len() {
        return Err(BenchError::Worker(format!(
            "worker answered chunk {} ({} values) for chunk {} ({} values)",
            out.chunk_id,
            out.values.len(),
            job.chunk_id,
            job.values.len()
        )));
    }
    Ok(out)
}

fn feed(children: &mut [Child], jobs: &[ChunkJob]) -> Result<()> {
    for (child, job) in children.iter_mut().zip(jobs) {
        // Dropping stdin after the write signals end of input.
        let Some(mut stdin) = child.stdin.take() else {
            return Err(BenchError::Worker("worker stdin not captured".to_string()));
        };
        bincode::serialize_into(&mut stdin, job)?;
        stdin.flush()?;
    }
    Ok(())
}

fn reap(children: Vec<Child>) {
    for mut child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}

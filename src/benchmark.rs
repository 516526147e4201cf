//! Local filesystem read/write benchmark

use crate::{
    error::{AppError, ErrorContext, Result},
    models::{Job, ReadWriteMbps, ReadWriteSpeedResult},
    stats,
    timing::timeit,
};
use chrono::Utc;
use rand::RngCore;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Prefix of every scratch file the benchmark creates
pub const SCRATCH_FILE_PREFIX: &str = "perftest-rw";

/// Raw per-file throughput samples in Mbps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadWriteSamples {
    pub write: Vec<f64>,
    pub read: Vec<f64>,
}

/// Uniformly random payload of `len` bytes
pub fn random_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut payload);
    payload
}

/// Files created during one run, removed when dropped
struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    fn new() -> Self {
        Self { paths: Vec::new() }
    }

    fn track(&mut self, path: PathBuf) -> &Path {
        self.paths.push(path);
        &self.paths[self.paths.len() - 1]
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "scratch file removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove scratch file"),
            }
        }
    }
}

/// Write-then-read benchmark over a target directory
#[derive(Debug, Clone)]
pub struct ReadWriteBenchmark {
    dir: PathBuf,
    jobs: Vec<Job>,
    run_id: Uuid,
}

impl ReadWriteBenchmark {
    pub fn new(dir: impl Into<PathBuf>, jobs: &[Job]) -> Self {
        Self {
            dir: dir.into(),
            jobs: jobs.to_vec(),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the `index`-th file of `job`, unique to this run
    pub fn scratch_path(&self, job: &Job, index: u32) -> PathBuf {
        self.dir.join(format!(
            "{}-{}-{}-{}",
            SCRATCH_FILE_PREFIX, self.run_id, job.bytes, index
        ))
    }

    fn ensure_directory(&self) -> Result<()> {
        let metadata = fs::metadata(&self.dir)
            .with_context(|| format!("Cannot access {}", self.dir.display()))?;
        if !metadata.is_dir() {
            return Err(AppError::io(format!("{} is not a directory", self.dir.display())));
        }
        Ok(())
    }

    /// Write every file, then read every file back, one sample per file
    ///
    /// Blocking. Scratch files are removed before returning, also when a
    /// write or read fails.
    pub fn run(&self) -> Result<ReadWriteSamples> {
        self.ensure_directory()?;
        for job in &self.jobs {
            job.validate()?;
        }

        let mut scratch = ScratchFiles::new();
        let mut written = Vec::new();
        let mut samples = ReadWriteSamples::default();

        for job in &self.jobs {
            let len = usize::try_from(job.bytes).map_err(|_| {
                AppError::validation(format!("Payload of {} bytes does not fit in memory", job.bytes))
            })?;

            for index in 0..job.iteration {
                let payload = random_payload(len);
                let path = scratch.track(self.scratch_path(job, index)).to_path_buf();

                let timed = timeit(|| fs::write(&path, &payload))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                let mbps = stats::mbps_from_bytes_and_millis(job.bytes, timed.window.delta_ms());
                debug!(path = %path.display(), millis = timed.window.delta_ms(), mbps, "file written");

                samples.write.push(mbps);
                written.push((path, job.bytes));
            }
        }

        for (path, bytes) in &written {
            let timed = timeit(|| fs::read(path))
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if timed.value.len() as u64 != *bytes {
                return Err(AppError::io(format!(
                    "Read {} bytes back from {}, expected {}",
                    timed.value.len(),
                    path.display(),
                    bytes
                )));
            }
            let mbps = stats::mbps_from_bytes_and_millis(*bytes, timed.window.delta_ms());
            debug!(path = %path.display(), millis = timed.window.delta_ms(), mbps, "file read");

            samples.read.push(mbps);
        }

        Ok(samples)
    }

    /// Run the benchmark and reduce the samples by mean
    pub fn measure(&self) -> Result<ReadWriteSpeedResult> {
        let samples = self.run()?;
        let mbps = ReadWriteMbps {
            read: stats::mean(&samples.read)?,
            write: stats::mean(&samples.write)?,
        };
        info!(read_mbps = mbps.read, write_mbps = mbps.write, "read/write measured");

        Ok(ReadWriteSpeedResult {
            mbps,
            file_count: samples.write.len(),
            completed_at: Utc::now(),
        })
    }
}

/// Run the read/write test in `dir` on the blocking thread pool
pub async fn run_read_write_test(dir: impl Into<PathBuf>, jobs: &[Job]) -> Result<ReadWriteSpeedResult> {
    let benchmark = ReadWriteBenchmark::new(dir, jobs);
    tokio::task::spawn_blocking(move || benchmark.measure()).await?
}

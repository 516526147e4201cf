//! Workload definitions: fixed payload sizes repeated a fixed number of times

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One configured (payload size, repeat count) pair
///
/// Each job contributes exactly `iteration` independent samples, all taken
/// at `bytes` payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    /// Payload size in bytes
    pub bytes: u64,
    /// Number of samples to take at this size
    pub iteration: u32,
}

impl Job {
    pub const fn new(bytes: u64, iteration: u32) -> Self {
        Self { bytes, iteration }
    }

    /// Reject jobs that cannot produce a meaningful sample
    pub fn validate(&self) -> Result<()> {
        if self.bytes == 0 {
            return Err(AppError::validation("Job payload size must be greater than 0"));
        }
        if self.iteration == 0 {
            return Err(AppError::validation(format!(
                "Job of {} bytes must run at least once",
                self.bytes
            )));
        }
        Ok(())
    }

    /// Parse a comma-separated job list such as `100000x4,10000000x3`
    pub fn parse_list(value: &str) -> Result<Vec<Job>> {
        let jobs = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Job::from_str)
            .collect::<Result<Vec<_>>>()?;

        if jobs.is_empty() {
            return Err(AppError::validation("Job list cannot be empty"));
        }
        Ok(jobs)
    }

    /// Render a job list in the same format `parse_list` accepts
    pub fn format_list(jobs: &[Job]) -> String {
        jobs.iter()
            .map(Job::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Total number of samples a job list produces
    pub fn total_iterations(jobs: &[Job]) -> usize {
        jobs.iter().map(|job| job.iteration as usize).sum()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.bytes, self.iteration)
    }
}

impl FromStr for Job {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let (bytes, iteration) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| AppError::validation(format!("Invalid job '{}': expected BYTESxITERATIONS", s)))?;

        let job = Job {
            bytes: bytes
                .trim()
                .parse()
                .map_err(|e| AppError::validation(format!("Invalid job size '{}': {}", bytes, e)))?,
            iteration: iteration
                .trim()
                .parse()
                .map_err(|e| AppError::validation(format!("Invalid job iteration '{}': {}", iteration, e)))?,
        };
        job.validate()?;
        Ok(job)
    }
}

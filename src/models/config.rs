//! Configuration data model and validation

use crate::models::Job;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable names understood by [`Config::merge_from_lookup`]
pub mod env_keys {
    pub const ENDPOINT: &str = "SPEED_TEST_ENDPOINT";
    pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECONDS";
    pub const PROBE_TIMEOUT: &str = "PROBE_TIMEOUT_SECONDS";
    pub const UPLOAD_JOBS: &str = "UPLOAD_JOBS";
    pub const DOWNLOAD_JOBS: &str = "DOWNLOAD_JOBS";
    pub const RW_JOBS: &str = "RW_JOBS";
    pub const ENABLE_COLOR: &str = "ENABLE_COLOR";

    pub const ALL: &[&str] = &[
        ENDPOINT,
        REQUEST_TIMEOUT,
        PROBE_TIMEOUT,
        UPLOAD_JOBS,
        DOWNLOAD_JOBS,
        RW_JOBS,
        ENABLE_COLOR,
    ];
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the speed-test endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bound on each metadata fetch
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_seconds: u64,

    /// Longest a latency or throughput probe may go without progress
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_seconds: u64,

    #[serde(default = "default_upload_jobs")]
    pub upload_jobs: Vec<Job>,

    #[serde(default = "default_download_jobs")]
    pub download_jobs: Vec<Job>,

    #[serde(default = "default_rw_jobs")]
    pub rw_jobs: Vec<Job>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Print results as JSON
    #[serde(default)]
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_seconds: default_request_timeout_secs(),
            probe_timeout_seconds: default_probe_timeout_secs(),
            upload_jobs: default_upload_jobs(),
            download_jobs: default_download_jobs(),
            rw_jobs: default_rw_jobs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
            json_output: false,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.endpoint)?;
        validate_timeout("Request timeout", self.request_timeout_seconds)?;
        validate_timeout("Probe timeout", self.probe_timeout_seconds)?;
        validate_jobs("upload", &self.upload_jobs)?;
        validate_jobs("download", &self.download_jobs)?;
        validate_jobs("read/write", &self.rw_jobs)?;
        Ok(())
    }

    /// Merge values from an arbitrary key lookup
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(env_keys::ENDPOINT) {
            self.endpoint = endpoint.trim().to_string();
        }

        if let Some(timeout) = lookup(env_keys::REQUEST_TIMEOUT) {
            self.request_timeout_seconds = parse_value(env_keys::REQUEST_TIMEOUT, &timeout)?;
        }

        if let Some(timeout) = lookup(env_keys::PROBE_TIMEOUT) {
            self.probe_timeout_seconds = parse_value(env_keys::PROBE_TIMEOUT, &timeout)?;
        }

        if let Some(jobs) = lookup(env_keys::UPLOAD_JOBS) {
            self.upload_jobs = parse_jobs(env_keys::UPLOAD_JOBS, &jobs)?;
        }

        if let Some(jobs) = lookup(env_keys::DOWNLOAD_JOBS) {
            self.download_jobs = parse_jobs(env_keys::DOWNLOAD_JOBS, &jobs)?;
        }

        if let Some(jobs) = lookup(env_keys::RW_JOBS) {
            self.rw_jobs = parse_jobs(env_keys::RW_JOBS, &jobs)?;
        }

        if let Some(enable_color) = lookup(env_keys::ENABLE_COLOR) {
            self.enable_color = parse_value(env_keys::ENABLE_COLOR, &enable_color)?;
        }

        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn parse_jobs(key: &str, value: &str) -> Result<Vec<Job>> {
    Job::parse_list(value).map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.is_empty() {
        return Err(AppError::config("Endpoint cannot be empty"));
    }

    let parsed = url::Url::parse(endpoint)
        .map_err(|e| AppError::config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(format!("Endpoint must use http or https: {}", endpoint)));
    }
    if parsed.host().is_none() {
        return Err(AppError::config(format!("Endpoint has no host: {}", endpoint)));
    }

    Ok(())
}

fn validate_timeout(name: &str, seconds: u64) -> Result<()> {
    let max = crate::defaults::MAX_TIMEOUT_SECONDS;
    if seconds == 0 {
        return Err(AppError::config(format!("{} must be greater than 0", name)));
    }
    if seconds > max {
        return Err(AppError::config(format!("{} cannot exceed {} seconds", name, max)));
    }
    Ok(())
}

fn validate_jobs(kind: &str, jobs: &[Job]) -> Result<()> {
    if jobs.is_empty() {
        return Err(AppError::config(format!("At least one {} job is required", kind)));
    }
    for job in jobs {
        job.validate()
            .map_err(|e| AppError::config(format!("Invalid {} job {}: {}", kind, job, e)))?;
    }
    Ok(())
}

// Default value functions for serde
fn default_endpoint() -> String {
    crate::defaults::DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_probe_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_PROBE_TIMEOUT.as_secs()
}

fn default_upload_jobs() -> Vec<Job> {
    crate::defaults::UPLOAD_JOBS.to_vec()
}

fn default_download_jobs() -> Vec<Job> {
    crate::defaults::DOWNLOAD_JOBS.to_vec()
}

fn default_rw_jobs() -> Vec<Job> {
    crate::defaults::RW_JOBS.to_vec()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

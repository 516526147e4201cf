//! Performance Tester
//!
//! Measures round-trip latency and upload/download throughput against a
//! remote speed-test endpoint, and local filesystem read/write throughput.
//! Raw timing samples are reduced to a handful of reported statistics
//! (average, median, jitter, percentile) for the CLI to render.

pub mod app;
pub mod benchmark;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod models;
pub mod output;
pub mod sampler;
pub mod stats;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use benchmark::{run_read_write_test, ReadWriteBenchmark};
pub use client::{HttpProbeTransport, PhaseTimestamps, ProbeRequest, ProbeTransport};
pub use error::{AppError, Result};
pub use models::{
    Config, InternetSpeedResult, Job, LatencyStats, ReadWriteSpeedResult, ServerLocation,
};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use sampler::{run_internet_test, Sampler};

/// Version with the commit and build time embedded by the build script
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Default configuration values
pub mod defaults {
    use crate::models::Job;
    use std::time::Duration;

    pub const DEFAULT_ENDPOINT: &str = "https://speed.cloudflare.com";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    /// Longest a probe may go without progress
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(300);
    /// Slowest upload rate tolerated on top of the probe timeout (1 Mbit/s)
    pub const MIN_UPLOAD_BYTES_PER_SEC: u64 = 125_000;
    pub const MAX_TIMEOUT_SECONDS: u64 = 3600;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Number of latency pings per run; not configurable
    pub const LATENCY_PROBE_COUNT: usize = 20;
    /// Payload of each latency ping, in bytes
    pub const LATENCY_PROBE_BYTES: u64 = 1000;
    /// Percentile reported as the upload/download speed
    pub const THROUGHPUT_PERCENTILE: f64 = 0.9;

    pub const RW_JOBS: &[Job] = &[Job::new(2_000_000_000, 1)];
    pub const UPLOAD_JOBS: &[Job] = &[
        Job::new(100_000, 4),
        Job::new(10_000_000, 3),
        Job::new(50_000_000, 2),
        Job::new(200_000_000, 1),
    ];
    pub const DOWNLOAD_JOBS: &[Job] = &[
        Job::new(100_000, 4),
        Job::new(10_000_000, 3),
        Job::new(50_000_000, 2),
        Job::new(200_000_000, 1),
    ];
}

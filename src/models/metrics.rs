//! Reported metrics and final test result shapes

use crate::error::Result;
use crate::stats;
use crate::types::PerformanceLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latency statistics over a sequence of ping samples (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub median: f64,
    pub jitter: f64,
}

impl LatencyStats {
    /// Reduce latency samples; fails on an empty sequence
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        Ok(Self {
            min: stats::min(samples)?,
            max: stats::max(samples)?,
            average: stats::mean(samples)?,
            median: stats::median(samples)?,
            jitter: stats::jitter(samples)?,
        })
    }

    /// Classify the average round trip
    pub fn performance_level(&self) -> PerformanceLevel {
        PerformanceLevel::from_latency_ms(self.average)
    }
}

/// Location of the server that answered the test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerLocation {
    pub city: String,
    pub region: String,
    pub lat: f64,
    pub lon: f64,
}

/// Upload/download throughput in megabits per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputMbps {
    pub upload: f64,
    pub download: f64,
}

/// Result of a complete internet speed test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternetSpeedResult {
    /// Ping statistics
    pub latency: LatencyStats,
    /// Colo code from the trace document
    pub colo: String,
    /// Resolved location for `colo`
    pub server_location: ServerLocation,
    /// 90th percentile of the upload and download samples
    pub throughput: ThroughputMbps,
    /// Number of upload samples that went into the percentile
    pub upload_samples: usize,
    /// Number of download samples that went into the percentile
    pub download_samples: usize,
    pub completed_at: DateTime<Utc>,
}

/// Read/write throughput in megabits per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadWriteMbps {
    pub read: f64,
    pub write: f64,
}

/// Result of a local read/write test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadWriteSpeedResult {
    pub mbps: ReadWriteMbps,
    /// Number of files written and read back
    pub file_count: usize,
    pub completed_at: DateTime<Utc>,
}

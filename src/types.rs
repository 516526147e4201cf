//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Direction of a throughput probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Payload flows from the server (`GET /__down`)
    Download,
    /// Payload flows to the server (`POST /__up`)
    Upload,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which test the CLI runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Latency, upload and download against the remote endpoint
    Internet,
    /// Local filesystem write-then-read throughput
    ReadWrite,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Internet => f.write_str("internet"),
            TestKind::ReadWrite => f.write_str("read/write"),
        }
    }
}

/// Performance classification based on average latency
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerformanceLevel {
    /// Good latency (< 50 ms)
    Good,
    /// Moderate latency (50-150 ms)
    Moderate,
    /// Poor latency (> 150 ms)
    Poor,
}

impl PerformanceLevel {
    /// Classify an average round trip in milliseconds
    pub fn from_latency_ms(ms: f64) -> Self {
        if ms < 50.0 {
            Self::Good
        } else if ms < 150.0 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Download.to_string(), "download");
        assert_eq!(Direction::Upload.to_string(), "upload");
    }

    #[test]
    fn test_test_kind_display() {
        assert_eq!(TestKind::Internet.to_string(), "internet");
        assert_eq!(TestKind::ReadWrite.to_string(), "read/write");
    }

    #[test]
    fn test_performance_level_boundaries() {
        assert_eq!(PerformanceLevel::from_latency_ms(0.0), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_latency_ms(49.9), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_latency_ms(50.0), PerformanceLevel::Moderate);
        assert_eq!(PerformanceLevel::from_latency_ms(150.0), PerformanceLevel::Poor);
    }
}

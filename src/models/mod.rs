//! Data models and structures for the performance tester

pub mod config;
pub mod job;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use job::Job;
pub use metrics::{
    InternetSpeedResult, LatencyStats, ReadWriteMbps, ReadWriteSpeedResult, ServerLocation,
    ThroughputMbps,
};

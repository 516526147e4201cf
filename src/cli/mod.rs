//! Command-line interface module

pub mod prompt;

pub use prompt::{prompt_for_path, read_path_from, PATH_NOT_FOUND, PATH_PROMPT};

use crate::types::TestKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Performance Tester - internet latency/throughput and local read/write speed
#[derive(Parser, Debug, Clone)]
#[command(name = "perftest")]
#[command(version = crate::LONG_VERSION, about, long_about = None)]
#[command(after_long_help = crate::config::EnvManager::display_env_help())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Network timeout in seconds, applied to metadata requests and to each probe stage
    #[arg(short, long, global = true, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Speed-test endpoint base URL
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Measure latency and upload/download speed
    Inet,
    /// Measure local read/write speed
    Rw {
        /// Directory to run the test in; asked for interactively when omitted
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

impl Command {
    pub fn kind(&self) -> TestKind {
        match self {
            Command::Inet => TestKind::Internet,
            Command::Rw { .. } => TestKind::ReadWrite,
        }
    }
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && !self.json && supports_color()
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    let max = crate::defaults::MAX_TIMEOUT_SECONDS;
    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > max {
                Err(format!("Duration cannot exceed {} seconds", max))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

//! `.env` loading and the environment variable help text

use crate::error::{AppError, Result};
use crate::models::config::env_keys;
use std::path::Path;
use tracing::debug;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    ///
    /// Variables already present in the process environment win over the file.
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;
            debug!("loaded configuration from .env file");
        } else {
            debug!("no .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (env_keys::ENDPOINT, "Speed-test endpoint base URL", "https://speed.cloudflare.com"),
            (env_keys::REQUEST_TIMEOUT, "Metadata request timeout in seconds (1-3600)", "10"),
            (env_keys::PROBE_TIMEOUT, "Longest a probe may stall, in seconds (1-3600)", "300"),
            (env_keys::UPLOAD_JOBS, "Upload workload, BYTESxITERATIONS list", "100000x4,10000000x3"),
            (env_keys::DOWNLOAD_JOBS, "Download workload, BYTESxITERATIONS list", "100000x4,10000000x3"),
            (env_keys::RW_JOBS, "Read/write workload, BYTESxITERATIONS list", "2000000000x1"),
            (env_keys::ENABLE_COLOR, "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }
}

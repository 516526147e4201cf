//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::{Config, Job}};
use tracing::debug;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser<'a> {
    cli: &'a Cli,
}

impl<'a> ConfigParser<'a> {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: &'a Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    ///
    /// Precedence, lowest first: defaults, `.env` file, process environment,
    /// command line.
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file()?;
        self.parse_with(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an explicit environment lookup
    pub fn parse_with<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        debug!(
            endpoint = %config.endpoint,
            request_timeout_s = config.request_timeout_seconds,
            probe_timeout_s = config.probe_timeout_seconds,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(timeout) = self.cli.timeout {
            config.request_timeout_seconds = timeout;
            config.probe_timeout_seconds = timeout;
        }

        if let Some(ref endpoint) = self.cli.endpoint {
            config.endpoint = endpoint.clone();
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only switches
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
        config.json_output = self.cli.json;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: &Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Endpoint: {}", config.endpoint));
    summary.push(format!("Request Timeout: {}s", config.request_timeout_seconds));
    summary.push(format!("Probe Timeout: {}s", config.probe_timeout_seconds));
    summary.push(format!("Upload Jobs: {}", Job::format_list(&config.upload_jobs)));
    summary.push(format!("Download Jobs: {}", Job::format_list(&config.download_jobs)));
    summary.push(format!("Read/Write Jobs: {}", Job::format_list(&config.rw_jobs)));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

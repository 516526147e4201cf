//! Structured logging setup
//!
//! The engine logs through `tracing` macros. This module decides level and
//! format from the configuration and installs a `tracing-subscriber` fmt
//! subscriber writing to stderr, so stdout stays reserved for results.

use crate::error::{AppError, Result};
use crate::models::Config;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Environment variable overriding the derived log level
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn as_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" | "FATAL" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub use_color: bool,
    /// Include file and line of each event
    pub include_location: bool,
}

impl LoggingConfig {
    /// Derive settings from the application configuration
    ///
    /// Debug mode logs everything down to debug as JSON with source
    /// locations, verbose mode logs info and up, otherwise only warnings.
    pub fn from_config(config: &Config) -> Self {
        let level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            level,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            use_color: config.enable_color && !config.debug,
            include_location: config.debug,
        }
    }

    /// Replace the level with an explicit override such as `LOG_LEVEL`
    pub fn with_level_override(mut self, level: Option<&str>) -> Result<Self> {
        if let Some(level) = level {
            self.level = level.parse()?;
        }
        Ok(self)
    }
}

/// Install the global subscriber
///
/// Fails if a global subscriber was already installed.
pub fn init_logging(settings: &LoggingConfig) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(settings.level.as_tracing_level())
        .with_writer(std::io::stderr)
        .with_ansi(settings.use_color)
        .with_file(settings.include_location)
        .with_line_number(settings.include_location)
        .with_target(settings.include_location);

    let installed = match settings.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Console => tracing::subscriber::set_global_default(builder.finish()),
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install log subscriber: {}", e)))
}

/// Derive settings from `config` and the `LOG_LEVEL` variable, then install them
pub fn init_from_config(config: &Config) -> Result<LoggingConfig> {
    let settings = LoggingConfig::from_config(config)
        .with_level_override(std::env::var(LOG_LEVEL_ENV).ok().as_deref())?;
    init_logging(&settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" info ".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("fatal".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!(matches!("loud".parse::<LogLevel>(), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Warn.as_str(), "WARN");
        assert_eq!(LogLevel::Info.as_tracing_level(), Level::INFO);
    }

    #[test]
    fn test_default_config_logs_warnings_only() {
        let settings = LoggingConfig::from_config(&Config::default());
        assert_eq!(settings.level, LogLevel::Warn);
        assert_eq!(settings.format, LogFormat::Console);
        assert!(settings.use_color);
        assert!(!settings.include_location);
    }

    #[test]
    fn test_verbose_and_debug_settings() {
        let verbose = LoggingConfig::from_config(&Config {
            verbose: true,
            ..Config::default()
        });
        assert_eq!(verbose.level, LogLevel::Info);
        assert_eq!(verbose.format, LogFormat::Console);

        let debug = LoggingConfig::from_config(&Config {
            debug: true,
            verbose: true,
            ..Config::default()
        });
        assert_eq!(debug.level, LogLevel::Debug);
        assert_eq!(debug.format, LogFormat::Json);
        assert!(debug.include_location);
        assert!(!debug.use_color);
    }

    #[test]
    fn test_no_color_config() {
        let settings = LoggingConfig::from_config(&Config {
            enable_color: false,
            ..Config::default()
        });
        assert!(!settings.use_color);
    }

    #[test]
    fn test_level_override() {
        let settings = LoggingConfig::from_config(&Config::default())
            .with_level_override(Some("trace"))
            .unwrap();
        assert_eq!(settings.level, LogLevel::Trace);

        let unchanged = LoggingConfig::from_config(&Config::default())
            .with_level_override(None)
            .unwrap();
        assert_eq!(unchanged.level, LogLevel::Warn);

        assert!(LoggingConfig::from_config(&Config::default())
            .with_level_override(Some("nope"))
            .is_err());
    }
}

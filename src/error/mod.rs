//! Error handling for the performance tester

use thiserror::Error;

/// Errors raised by the measurement engine and its CLI front-end
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection-level failures (refused, reset, TLS handshake)
    #[error("Network error: {0}")]
    Network(String),

    /// DNS resolution errors
    #[error("DNS resolution error: {0}")]
    DnsResolution(String),

    /// HTTP protocol errors and unexpected status codes
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem errors (missing directory, permission denied, disk full)
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed responses (JSON, trace document, headers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Statistics calculation errors
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new DNS resolution error
    pub fn dns_resolution<S: Into<String>>(message: S) -> Self {
        Self::DnsResolution(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new statistics error
    pub fn statistics<S: Into<String>>(message: S) -> Self {
        Self::Statistics(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Rewrite the message while keeping the variant
    fn map_message<F: FnOnce(String) -> String>(self, f: F) -> Self {
        match self {
            Self::Config(msg) => Self::Config(f(msg)),
            Self::Network(msg) => Self::Network(f(msg)),
            Self::DnsResolution(msg) => Self::DnsResolution(f(msg)),
            Self::HttpRequest(msg) => Self::HttpRequest(f(msg)),
            Self::Timeout(msg) => Self::Timeout(f(msg)),
            Self::Validation(msg) => Self::Validation(f(msg)),
            Self::Io(msg) => Self::Io(f(msg)),
            Self::Parse(msg) => Self::Parse(f(msg)),
            Self::Statistics(msg) => Self::Statistics(f(msg)),
            Self::Internal(msg) => Self::Internal(f(msg)),
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::DnsResolution(_) => "DNS",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Statistics(_) => "STATS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if running the test again might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::HttpRequest(_) | Self::Timeout(_) | Self::DnsResolution(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => false,
            Self::Io(_) | Self::Statistics(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Network(msg) => {
                format!("Network connectivity issue: {}\n\nSuggestion: Check your internet connection and try again.", msg)
            }
            Self::DnsResolution(msg) => {
                format!("DNS resolution failed: {}\n\nSuggestion: Check that the speed test endpoint host name resolves on this machine.", msg)
            }
            Self::HttpRequest(msg) => {
                format!("HTTP request failed: {}\n\nSuggestion: The speed test endpoint may be down or rate limiting. Try again later or use --endpoint.", msg)
            }
            Self::Timeout(msg) => {
                format!("Request timed out: {}\n\nSuggestion: Increase the timeout value using --timeout or PROBE_TIMEOUT_SECONDS.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the format of your endpoint URL, job lists, or other configuration values.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check that the directory exists, is writable, and has enough free space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: The endpoint returned an unexpected response. Check that --endpoint points at a speed test server.", msg)
            }
            Self::Statistics(msg) => {
                format!("Statistics calculation failed: {}\n\nSuggestion: This may indicate insufficient or invalid test data.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::Network(_) | Self::DnsResolution(_) | Self::HttpRequest(_) => 2,  // Network issues
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Statistics(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) | Self::DnsResolution(_) | Self::HttpRequest(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::Statistics(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else if error.is_decode() {
            Self::parse(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<hyper::Error> for AppError {
    fn from(error: hyper::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<trust_dns_resolver::error::ResolveError> for AppError {
    fn from(error: trust_dns_resolver::error::ResolveError) -> Self {
        Self::dns_resolution(error.to_string())
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("Background task failed: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error, keeping its category
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error
    fn context(self, message: &'static str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            let error: AppError = e.into();
            error.map_message(|msg| format!("{}: {}", context, msg))
        })
    }

    fn context(self, message: &'static str) -> Result<T> {
        self.with_context(|| message.to_string())
    }
}

/// Error reporter for CLI failure output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error the way `report_error` prints it
    pub fn render(&self, error: &AppError) -> String {
        let mut rendered = error.format_for_console(self.use_color);

        if self.verbose {
            rendered.push_str("\n\n");
            rendered.push_str(&error.user_friendly_message());

            if error.is_recoverable() {
                let hint = "This error might be temporary. You can try running the command again.";
                rendered.push_str("\n\n");
                if self.use_color {
                    use colored::Colorize;
                    rendered.push_str(&hint.green().to_string());
                } else {
                    rendered.push_str(hint);
                }
            }
        }

        rendered
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid configuration");
        assert_eq!(config_error.category(), "CONFIG");
        assert!(!config_error.is_recoverable());
        assert_eq!(config_error.exit_code(), 1);

        let network_error = AppError::network("Connection failed");
        assert_eq!(network_error.category(), "NETWORK");
        assert!(network_error.is_recoverable());
        assert_eq!(network_error.exit_code(), 2);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::io("No such file or directory");
        let display = error.to_string();
        assert!(display.contains("I/O error"));
        assert!(display.contains("No such file or directory"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::network("network"),
            AppError::dns_resolution("dns"),
            AppError::http_request("http"),
            AppError::timeout("timeout"),
            AppError::validation("validation"),
            AppError::io("io"),
            AppError::parse("parse"),
            AppError::statistics("stats"),
            AppError::internal("internal"),
        ];

        let expected_categories = [
            "CONFIG", "NETWORK", "DNS", "HTTP", "TIMEOUT",
            "VALIDATION", "IO", "PARSE", "STATS", "INTERNAL",
        ];

        for (error, expected) in errors.iter().zip(expected_categories.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("test").exit_code(), 1);
        assert_eq!(AppError::network("test").exit_code(), 2);
        assert_eq!(AppError::timeout("test").exit_code(), 3);
        assert_eq!(AppError::io("test").exit_code(), 5);
        assert_eq!(AppError::statistics("test").exit_code(), 6);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = AppError::io("Permission denied");
        let message = error.user_friendly_message();
        assert!(message.contains("File operation failed"));
        assert!(message.contains("Suggestion:"));
        assert!(message.contains("Permission denied"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<u64>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let json_error = serde_json::from_str::<serde_json::Value>("[{").unwrap_err();
        let app_error: AppError = json_error.into();
        assert_eq!(app_error.category(), "PARSE");
        assert!(app_error.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let url_error = url::Url::parse("not-a-valid-url").unwrap_err();
        let app_error: AppError = url_error.into();
        assert_eq!(app_error.category(), "PARSE");
        assert!(app_error.to_string().contains("URL parse error"));
    }

    #[test]
    fn test_dotenv_error_conversion() {
        let dotenv_error = dotenv::Error::LineParse(".env".to_string(), 1);
        let app_error: AppError = dotenv_error.into();
        assert_eq!(app_error.category(), "CONFIG");
        assert!(app_error.to_string().contains("Environment file error"));
    }

    #[test]
    fn test_context_keeps_category() {
        let result: Result<()> = Err(AppError::network("connection refused"));
        let error = result.context("While probing /__down").unwrap_err();

        assert_eq!(error.category(), "NETWORK");
        assert!(error.to_string().contains("While probing /__down"));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_context_on_foreign_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let error = result.with_context(|| "Writing scratch file".to_string()).unwrap_err();

        assert_eq!(error.category(), "IO");
        assert!(error.to_string().contains("Writing scratch file: denied"));
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::config("Test error");
        let formatted_no_color = error.format_for_console(false);
        let formatted_color = error.format_for_console(true);

        assert_eq!(formatted_no_color, "[CONFIG] Configuration error: Test error");
        assert!(formatted_color.contains("CONFIG"));
        assert!(formatted_color.contains("Test error"));
    }

    #[test]
    fn test_reporter_render_verbose() {
        let reporter = ErrorReporter::new(false, true);
        let rendered = reporter.render(&AppError::timeout("probe exceeded 300s"));

        assert!(rendered.starts_with("[TIMEOUT]"));
        assert!(rendered.contains("Suggestion:"));
        assert!(rendered.contains("might be temporary"));
    }

    #[test]
    fn test_reporter_render_quiet() {
        let reporter = ErrorReporter::new(false, false);
        let rendered = reporter.render(&AppError::io("disk full"));
        assert_eq!(rendered, "[IO] I/O error: disk full");
    }

    #[test]
    fn test_error_reporter_default() {
        let reporter = ErrorReporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.verbose);
    }

    #[test]
    fn test_resolver_error_with_context() {
        let result: std::result::Result<(), trust_dns_resolver::error::ResolveError> =
            Err("no record found".into());
        let error = result
            .with_context(|| "DNS lookup failed for speed.example".to_string())
            .unwrap_err();

        assert!(matches!(error, AppError::DnsResolution(_)));
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("DNS lookup failed for speed.example: no record found"));
    }
}

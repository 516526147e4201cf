//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation.

use crate::{
    error::{AppError, Result},
    models::{InternetSpeedResult, LatencyStats, ReadWriteSpeedResult, ServerLocation},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the outcome of an internet speed test
    fn format_internet_result(&self, result: &InternetSpeedResult) -> Result<String>;

    /// Format the outcome of a read/write test
    fn format_read_write_result(&self, result: &ReadWriteSpeedResult) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Also show median and jitter, colo and sample counts
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

pub(crate) fn write_failed(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

/// Two decimals, the precision every rendered number uses
pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

pub(crate) fn location_label(location: &ServerLocation) -> String {
    format!("{}, {}", location.city, location.region)
}

/// `(label, value)` rows of the latency block
pub(crate) fn latency_rows(latency: &LatencyStats, verbose: bool) -> Vec<(&'static str, f64)> {
    let mut rows = vec![
        ("avg", latency.average),
        ("min", latency.min),
        ("max", latency.max),
    ];
    if verbose {
        rows.push(("median", latency.median));
        rows.push(("jitter", latency.jitter));
    }
    rows
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border).map_err(write_failed)?;
        writeln!(output, "  {}  ", title).map_err(write_failed)?;
        write!(output, "{}", border).map_err(write_failed)?;

        Ok(output)
    }

    fn format_internet_result(&self, result: &InternetSpeedResult) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Server Location: {}", location_label(&result.server_location)).map_err(write_failed)?;
        if self.options.verbose_mode {
            writeln!(output, "Server Colo: {}", result.colo).map_err(write_failed)?;
        }

        writeln!(output, "Latency:").map_err(write_failed)?;
        for (label, value) in latency_rows(&result.latency, self.options.verbose_mode) {
            writeln!(output, "\t{}: {} ms", label, format_decimal(value)).map_err(write_failed)?;
        }

        writeln!(output, "Upload Speed(Mbps): {}", format_decimal(result.throughput.upload)).map_err(write_failed)?;
        write!(output, "Download Speed(Mbps): {}", format_decimal(result.throughput.download)).map_err(write_failed)?;

        if self.options.verbose_mode {
            write!(
                output,
                "\nSamples: {} upload, {} download",
                result.upload_samples, result.download_samples
            )
            .map_err(write_failed)?;
        }

        Ok(output)
    }

    fn format_read_write_result(&self, result: &ReadWriteSpeedResult) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Read Speed(Mbps): {}", format_decimal(result.mbps.read)).map_err(write_failed)?;
        write!(output, "Write Speed(Mbps): {}", format_decimal(result.mbps.write)).map_err(write_failed)?;

        if self.options.verbose_mode {
            write!(output, "\nFiles: {}", result.file_count).map_err(write_failed)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}

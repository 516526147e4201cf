//! Colored formatter implementation with terminal color support

use super::formatter::{
    format_decimal, latency_rows, location_label, write_failed, FormattingOptions, OutputFormatter,
};
use crate::{
    error::Result,
    models::{InternetSpeedResult, ReadWriteSpeedResult},
    types::PerformanceLevel,
};
use colored::*;
use std::fmt::Write as _;

const CHECK: &str = "✔";

impl PerformanceLevel {
    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Good => Color::Green,
            Self::Moderate => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub error: Color,
    pub value: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            error: Color::Red,
            value: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn strong(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn check(&self) -> ColoredString {
        self.colorize(CHECK, self.color_scheme.success)
    }

    /// Latency value tinted by how good it is
    fn latency_colored(&self, millis: f64) -> ColoredString {
        let level = PerformanceLevel::from_latency_ms(millis);
        self.colorize(&format!("{} ms", format_decimal(millis)), level.color())
    }

    fn mbps_colored(&self, mbps: f64) -> ColoredString {
        self.strong(&format_decimal(mbps), self.color_scheme.value)
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "=".repeat(title.len() + 4);
        let border = self.colorize(&border, self.color_scheme.muted);

        Ok(format!(
            "{}\n  {}  \n{}",
            border,
            self.strong(title, self.color_scheme.header),
            border
        ))
    }

    fn format_internet_result(&self, result: &InternetSpeedResult) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "{} {} {}",
            self.check(),
            self.bold("Server Location:"),
            location_label(&result.server_location)
        )
        .map_err(write_failed)?;
        if self.options.verbose_mode {
            writeln!(
                output,
                "{} {} {}",
                self.check(),
                self.bold("Server Colo:"),
                self.colorize(&result.colo, self.color_scheme.muted)
            )
            .map_err(write_failed)?;
        }

        writeln!(output, "{} {}", self.check(), self.bold("Latency:")).map_err(write_failed)?;
        for (label, value) in latency_rows(&result.latency, self.options.verbose_mode) {
            writeln!(output, "\t{}: {}", label, self.latency_colored(value)).map_err(write_failed)?;
        }

        writeln!(
            output,
            "{} {} {}",
            self.check(),
            self.bold("Upload Speed(Mbps):"),
            self.mbps_colored(result.throughput.upload)
        )
        .map_err(write_failed)?;
        write!(
            output,
            "{} {} {}",
            self.check(),
            self.bold("Download Speed(Mbps):"),
            self.mbps_colored(result.throughput.download)
        )
        .map_err(write_failed)?;

        if self.options.verbose_mode {
            let samples = format!(
                "Samples: {} upload, {} download",
                result.upload_samples, result.download_samples
            );
            write!(output, "\n{}", self.colorize(&samples, self.color_scheme.muted)).map_err(write_failed)?;
        }

        Ok(output)
    }

    fn format_read_write_result(&self, result: &ReadWriteSpeedResult) -> Result<String> {
        let mut output = String::new();

        writeln!(
            output,
            "{} {} {}",
            self.check(),
            self.bold("Read Speed(Mbps):"),
            self.mbps_colored(result.mbps.read)
        )
        .map_err(write_failed)?;
        write!(
            output,
            "{} {} {}",
            self.check(),
            self.bold("Write Speed(Mbps):"),
            self.mbps_colored(result.mbps.write)
        )
        .map_err(write_failed)?;

        if self.options.verbose_mode {
            let files = format!("Files: {}", result.file_count);
            write!(output, "\n{}", self.colorize(&files, self.color_scheme.muted)).map_err(write_failed)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!(
            "{} {}",
            self.colorize("✖", self.color_scheme.error),
            self.strong(error, self.color_scheme.error)
        ))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.check(), self.colorize(message, self.color_scheme.success)))
    }
}

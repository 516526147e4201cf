//! Output formatting and display system
//!
//! Renders engine results for the terminal, either colored or plain, or as
//! JSON for scripting.

mod colored;
mod formatter;

pub use self::colored::{ColorScheme, ColoredFormatter};
pub use formatter::{format_decimal, FormattingOptions, OutputFormatter, PlainFormatter};

use crate::{error::Result, types::TestKind};
use serde::Serialize;

pub const INTERNET_FAILURE: &str = "Internet speed test failed!";
pub const READ_WRITE_FAILURE: &str = "Read/write test failed";

/// Line printed when a test of `kind` aborts
pub fn failure_message(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Internet => INTERNET_FAILURE,
        TestKind::ReadWrite => READ_WRITE_FAILURE,
    }
}

/// Title shown above verbose results
pub fn test_title(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Internet => "Internet Speed Test",
        TestKind::ReadWrite => "Read/Write Speed Test",
    }
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Pretty-printed JSON rendering of any result
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

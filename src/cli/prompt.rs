//! Interactive prompt for the read/write test directory
//!
//! Uses `dialoguer` when the feature is enabled and falls back to plain
//! stdin/stdout otherwise. Either way the question is repeated until an
//! existing path is entered.

use crate::error::{AppError, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub const PATH_PROMPT: &str = "Path where you want to perform test:";
pub const PATH_NOT_FOUND: &str = "path does not exist!";

fn existing_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let path = Path::new(trimmed);
    path.exists().then(|| path.to_path_buf())
}

/// Ask for a directory on the terminal
pub fn prompt_for_path() -> Result<PathBuf> {
    if cfg!(feature = "dialoguer") {
        prompt_enhanced()
    } else {
        prompt_basic()
    }
}

fn prompt_basic() -> Result<PathBuf> {
    let stdin = io::stdin();
    read_path_from(stdin.lock(), io::stdout())
}

#[cfg(feature = "dialoguer")]
fn prompt_enhanced() -> Result<PathBuf> {
    use dialoguer::Input;

    let answer: String = Input::new()
        .with_prompt(PATH_PROMPT.trim_end_matches(':'))
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            existing_path(input).map(|_| ()).ok_or(PATH_NOT_FOUND)
        })
        .interact_text()
        .map_err(|e| AppError::io(format!("Path prompt failed: {}", e)))?;

    existing_path(&answer).ok_or_else(|| AppError::io(PATH_NOT_FOUND))
}

#[cfg(not(feature = "dialoguer"))]
fn prompt_enhanced() -> Result<PathBuf> {
    prompt_basic()
}

/// Prompt on `output` and read answers from `input` until one names an
/// existing path
///
/// End of input without a valid answer is an error.
pub fn read_path_from<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<PathBuf> {
    loop {
        write!(output, "{} ", PATH_PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::io("No path entered"));
        }

        match existing_path(&line) {
            Some(path) => return Ok(path),
            None => writeln!(output, "{}", PATH_NOT_FOUND)?,
        }
    }
}

//! Statistics over raw timing samples
//!
//! Pure functions over `&[f64]`. Order statistics sort a private copy and
//! never reorder the caller's slice. An empty input is always an
//! [`AppError::Statistics`] error rather than a silent zero or NaN.

use crate::error::{AppError, Result};

fn ensure_non_empty(values: &[f64], metric: &str) -> Result<()> {
    if values.is_empty() {
        return Err(AppError::statistics(format!(
            "Cannot compute {} of an empty sample set",
            metric
        )));
    }
    Ok(())
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Smallest sample
pub fn min(values: &[f64]) -> Result<f64> {
    ensure_non_empty(values, "minimum")?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Largest sample
pub fn max(values: &[f64]) -> Result<f64> {
    ensure_non_empty(values, "maximum")?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    ensure_non_empty(values, "mean")?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle element for odd lengths, average of the two middle elements otherwise
pub fn median(values: &[f64]) -> Result<f64> {
    ensure_non_empty(values, "median")?;
    let sorted = sorted_copy(values);
    let half = sorted.len() / 2;

    if sorted.len() % 2 == 1 {
        Ok(sorted[half])
    } else {
        Ok((sorted[half - 1] + sorted[half]) / 2.0)
    }
}

/// Rank-interpolated percentile, `p` in `[0, 1]`
///
/// The fractional rank is `(n - 1) * p`; the result interpolates linearly
/// between the floor-ranked element and its upper neighbour, or is the
/// floor element itself when it is the last one.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    ensure_non_empty(values, "percentile")?;
    if !(0.0..=1.0).contains(&p) {
        return Err(AppError::validation(format!(
            "Percentile must be within [0, 1], got {}",
            p
        )));
    }

    let sorted = sorted_copy(values);
    let position = (sorted.len() - 1) as f64 * p;
    let lower_index = position.floor() as usize;
    let weight = position - lower_index as f64;

    match sorted.get(lower_index + 1) {
        Some(&upper_value) => {
            let lower_value = sorted[lower_index];
            Ok(lower_value + weight * (upper_value - lower_value))
        }
        None => Ok(sorted[lower_index]),
    }
}

/// Mean absolute difference between consecutive samples, in input order
///
/// This tracks how much successive pings vary, so unlike the other
/// reductions it depends on sample order. A single sample has no
/// variation and yields 0.
pub fn jitter(values: &[f64]) -> Result<f64> {
    ensure_non_empty(values, "jitter")?;
    if values.len() == 1 {
        return Ok(0.0);
    }

    let differences: Vec<f64> = values
        .windows(2)
        .map(|pair| (pair[0] - pair[1]).abs())
        .collect();
    mean(&differences)
}

/// Throughput in megabits per second for `bytes` moved in `millis`
///
/// A non-positive or non-finite duration carries no throughput information
/// and yields `0.0`.
pub fn mbps_from_bytes_and_millis(bytes: u64, millis: f64) -> f64 {
    if !millis.is_finite() || millis <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / (millis / 1000.0) / 1e6
}


// Additional property-based tests in separate module
#[cfg(test)]
mod comprehensive_tests;

//! Wall-clock timing of synchronous local operations

use std::time::{Duration, Instant};

/// Monotonic start/end marks around one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    pub start: Instant,
    pub end: Instant,
    pub delta: Duration,
}

impl TimingWindow {
    /// Elapsed time in fractional milliseconds
    pub fn delta_ms(&self) -> f64 {
        self.delta.as_secs_f64() * 1000.0
    }
}

/// Return value of a timed call together with its timing window
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub window: TimingWindow,
}

/// Run `operation` exactly once and time it
///
/// The operation's error is returned unchanged and its partial timing is
/// dropped; nothing is retried.
pub fn timeit<T, E, F>(operation: F) -> Result<Timed<T>, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let start = Instant::now();
    let value = operation()?;
    let end = Instant::now();

    Ok(Timed {
        value,
        window: TimingWindow {
            start,
            end,
            delta: end.duration_since(start),
        },
    })
}

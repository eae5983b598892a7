//! Stopwatch-style timer with human-readable output

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::config::{Config, DEFAULT_TIMER_PRECISION};

const SECONDS_PER_DAY: u64 = 86_400;

/// Measures wall-clock time between two samples.
///
/// `start` and `end` are seconds since the Unix epoch and may be set by hand.
/// The usual way to fill them is a timed scope:
///
/// ```
/// use nanos::Timer;
///
/// let mut timer = Timer::with_precision(3);
/// let sum: u64 = timer.time(|| (1..=1_000).sum());
/// assert_eq!(sum, 500_500);
/// assert!(timer.elapsed() >= 0.0);
/// println!("summed in {}", timer);
/// ```
///
/// The timer has no internal locking. Use one instance per unit of work.
#[derive(Clone)]
pub struct Timer<C: Clock = SystemClock> {
    /// Number of fractional digits in [`Timer::verbose`].
    pub precision: u32,
    pub start: Option<f64>,
    pub end: Option<f64>,
    clock: C,
}

impl Timer {
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_TIMER_PRECISION)
    }

    pub fn with_precision(precision: u32) -> Self {
        Self::with_clock(precision, SystemClock)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_precision(config.timer_precision)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Timer<C> {
    pub fn with_clock(precision: u32, clock: C) -> Self {
        Self {
            precision,
            start: None,
            end: None,
            clock,
        }
    }

    /// Seconds between `start` and `end`.
    ///
    /// Zero if the timer never started. While running (no `end` yet) the
    /// clock is read, so repeated calls keep growing.
    pub fn elapsed(&self) -> f64 {
        match self.start {
            None => 0.0,
            Some(start) => self.end.unwrap_or_else(|| self.clock.now()) - start,
        }
    }

    /// Elapsed time as `H:MM:SS.F` with `precision` fractional digits.
    pub fn verbose(&self) -> String {
        format_elapsed(self.elapsed(), self.precision)
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// Record the start sample. Any previous end sample is discarded.
    pub fn start_now(&mut self) {
        self.start = Some(self.clock.now());
        self.end = None;
    }

    /// Record the end sample.
    pub fn stop(&mut self) {
        self.end = Some(self.clock.now());
    }

    /// Start timing until the returned guard is dropped.
    ///
    /// The guard derefs to the timer so the running value can be inspected.
    pub fn scope(&mut self) -> TimerScope<'_, C> {
        self.start_now();
        TimerScope { timer: self }
    }

    /// Time a closure. The end sample is taken even if `work` panics.
    pub fn time<T>(&mut self, work: impl FnOnce() -> T) -> T {
        let _scope = self.scope();
        work()
    }

    /// Time a future until it completes or is dropped.
    pub async fn time_async<F>(&mut self, work: F) -> F::Output
    where
        F: Future,
    {
        let _scope = self.scope();
        work.await
    }
}

impl<C: Clock> fmt::Display for Timer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verbose())
    }
}

impl<C: Clock> fmt::Debug for Timer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Timer [start={}, end={}]>",
            Stamp(self.start),
            Stamp(self.end)
        )
    }
}

struct Stamp(Option<f64>);

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            // Debug keeps the trailing ".0" on whole values
            Some(value) => write!(f, "{:?}", value),
            None => f.write_str("None"),
        }
    }
}

/// Guard returned by [`Timer::scope`]; records the end sample on drop.
pub struct TimerScope<'a, C: Clock = SystemClock> {
    timer: &'a mut Timer<C>,
}

impl<C: Clock> Deref for TimerScope<'_, C> {
    type Target = Timer<C>;

    fn deref(&self) -> &Self::Target {
        self.timer
    }
}

impl<C: Clock> Drop for TimerScope<'_, C> {
    fn drop(&mut self) {
        self.timer.stop();
        debug!(elapsed = self.timer.elapsed(), "timed scope finished");
    }
}

/// Render seconds as `H:MM:SS.F` with exactly `precision` fractional digits.
///
/// The fraction is rounded once. When it rounds up to a whole second the
/// second is carried and the fraction prints as zeros. Durations of a day or
/// more get a `N day(s), ` prefix, negative ones a leading `-` unless they
/// round to zero. NaN and infinities print as themselves.
pub fn format_elapsed(seconds: f64, precision: u32) -> String {
    if !seconds.is_finite() {
        return seconds.to_string();
    }
    let magnitude = seconds.abs();
    let mut whole = magnitude.trunc() as u64;
    let fraction = magnitude.fract();

    let width = precision as usize;
    let rounded = format!("{:.*}", width, fraction);
    let (units, digits) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let digits = if units == "0" {
        digits.to_string()
    } else {
        whole = whole.saturating_add(1);
        "0".repeat(width)
    };

    let is_zero = whole == 0 && digits.bytes().all(|d| d == b'0');
    let sign = if seconds < 0.0 && !is_zero { "-" } else { "" };
    format!("{}{}.{}", sign, format_clock(whole), digits)
}

fn format_clock(total_seconds: u64) -> String {
    let days = total_seconds / SECONDS_PER_DAY;
    let rest = total_seconds % SECONDS_PER_DAY;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

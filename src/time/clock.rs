//! Wall-clock sources for the timer

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of wall-clock samples, in seconds since the Unix epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => since_epoch.as_secs_f64(),
            // clock set before 1970
            Err(e) => -e.duration().as_secs_f64(),
        }
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> f64,
{
    fn now(&self) -> f64 {
        self()
    }
}

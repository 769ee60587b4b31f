//! Minimum-spacing rate limiter for quota-bound providers.
//!
//! Keyed providers allow only a handful of calls per minute on their free
//! tiers. Each such adapter owns a limiter and calls `acquire()` before every
//! request; the call blocks until `min_interval` has passed since the
//! previous request.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Serializes calls with a minimum spacing between them.
#[derive(Debug)]
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time left before the next call may go out (zero if allowed now).
    pub fn remaining_wait(&self) -> Duration {
        let last = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            None => Duration::ZERO,
            Some(at) => self.min_interval.saturating_sub(at.elapsed()),
        }
    }

    /// Block until a call is allowed, then record it. Returns the time slept.
    pub fn acquire(&self) -> Duration {
        // Holding the lock while sleeping is what serializes concurrent callers.
        let mut last = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        let wait = match *last {
            None => Duration::ZERO,
            Some(at) => self.min_interval.saturating_sub(at.elapsed()),
        };
        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limiter waiting");
            std::thread::sleep(wait);
        }
        *last = Some(Instant::now());
        wait
    }
}

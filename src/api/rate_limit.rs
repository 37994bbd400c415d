//! Sliding-window request governor
//!
//! Keeps the timestamps of recent requests and blocks the calling thread until
//! admitting another request would not exceed the configured per-minute limit.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

/// Length of the trailing window the limit applies to
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Extra wait added after the oldest request leaves the window
pub const SAFETY_MARGIN: Duration = Duration::from_millis(50);

/// Source of time for the governor
///
/// Abstracted so tests can advance time without actually sleeping.
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
    /// Blocks the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant::now` and `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Admits at most `limit` requests in any trailing 60-second window
#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    limit: usize,
    request_times: VecDeque<Instant>,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Creates a governor allowing `rate_per_minute` requests per minute
    ///
    /// A rate of zero is treated as one so that callers always make progress.
    pub fn per_minute(rate_per_minute: u32) -> Self {
        Self::with_clock(rate_per_minute, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a governor driven by a custom clock
    pub fn with_clock(rate_per_minute: u32, clock: C) -> Self {
        let limit = rate_per_minute.max(1) as usize;
        Self {
            limit,
            request_times: VecDeque::with_capacity(limit),
            clock,
        }
    }

    /// Maximum number of requests per window
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of requests currently counted against the window
    pub fn in_window(&self) -> usize {
        self.request_times.len()
    }

    /// Waits until a request may be issued and records it
    ///
    /// Returns the total time spent sleeping.
    pub fn acquire(&mut self) -> Duration {
        let mut waited = Duration::ZERO;
        loop {
            let now = self.clock.now();
            self.evict_expired(now);

            if self.request_times.len() < self.limit {
                self.request_times.push_back(now);
                return waited;
            }

            // Non-empty here: len >= limit >= 1
            let oldest = self.request_times[0];
            let elapsed = now.saturating_duration_since(oldest);
            let sleep_for = RATE_WINDOW.saturating_sub(elapsed) + SAFETY_MARGIN;

            debug!(
                limit = self.limit,
                wait_ms = sleep_for.as_millis() as u64,
                "Rate limit reached, waiting"
            );
            self.clock.sleep(sleep_for);
            waited += sleep_for;
        }
    }

    /// Drops timestamps that have fallen out of the window
    fn evict_expired(&mut self, now: Instant) {
        while let Some(&oldest) = self.request_times.front() {
            if now.saturating_duration_since(oldest) > RATE_WINDOW {
                self.request_times.pop_front();
            } else {
                break;
            }
        }
    }
}

/*!
 * Rate Limiter
 * Monotonic-clock throttle bounding messages per unit time
 */

use std::thread;
use std::time::{Duration, Instant};

/// Timestamp-based throttle enforcing a minimum inter-message period
///
/// Records the instant of the last successful operation; before the next
/// attempt, sleeps out whatever remains of the minimum period.
#[derive(Debug)]
pub struct RateLimiter {
    min_period: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    /// Throttle to at most `max_rate` operations per second
    #[must_use]
    pub fn new(max_rate: f64) -> Self {
        assert!(
            max_rate.is_finite() && max_rate > 0.0,
            "message rate must be positive"
        );
        Self {
            min_period: Duration::from_secs_f64(1.0 / max_rate),
            last: None,
        }
    }

    /// Sleep until the minimum period since the last marked success has
    /// elapsed; returns immediately if it already has
    pub fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_period {
                thread::sleep(self.min_period - elapsed);
            }
        }
    }

    /// Record a successful operation at the current instant
    #[inline]
    pub fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}

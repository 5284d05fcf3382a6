//! # Retry policy for collector delivery.
//!
//! [`RetryPolicy`] controls how many times a failed delivery is retried
//! and how the delay between attempts grows. The delay for attempt `n`
//! is `first × factor^n`, clamped to `max`; the base is derived purely
//! from the attempt number, so one delay never feeds into the next.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use modinput::RetryPolicy;
//!
//! let retry = RetryPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     retries: 3,
//! };
//!
//! // Attempt 0 — uses 'first' (100ms)
//! assert_eq!(retry.delay(0), Duration::from_millis(100));
//!
//! // Attempt 1 — first × factor^1 = 200ms
//! assert_eq!(retry.delay(1), Duration::from_millis(200));
//!
//! // Attempt 10 — 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(retry.delay(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

/// Delivery retry policy.
///
/// Encapsulates the parameters that determine retry count and delay growth:
/// - [`RetryPolicy::retries`] — additional attempts after the first;
/// - [`RetryPolicy::factor`] — multiplicative growth factor;
/// - [`RetryPolicy::first`] — the initial delay;
/// - [`RetryPolicy::max`] — the maximum delay cap.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Initial delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Number of retries after the initial attempt.
    pub retries: u32,
}

impl Default for RetryPolicy {
    /// Returns a policy with:
    /// - `retries = 3`;
    /// - `first = 1s`;
    /// - `factor = 2.0`;
    /// - `max = 10s`.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(10),
            factor: 2.0,
            retries: 3,
        }
    }
}

impl RetryPolicy {
    /// Computes the delay before the retry following attempt number
    /// `attempt` (0-indexed).
    ///
    /// The base delay is `first × factor^attempt`, clamped to
    /// [`RetryPolicy::max`]. Overflow and non-finite intermediates clamp
    /// to the cap as well.
    pub fn delay(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(unclamped_secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_zero_returns_first() {
        let policy = RetryPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            retries: 3,
        };
        assert_eq!(policy.delay(0), Duration::from_millis(100));
    }

    #[test]
    fn exponential_growth() {
        let policy = RetryPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            retries: 3,
        };

        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn constant_factor() {
        let policy = RetryPolicy {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 1.0,
            retries: 3,
        };
        for attempt in 0..10 {
            assert_eq!(
                policy.delay(attempt),
                Duration::from_millis(500),
                "attempt {} should be constant at 500ms",
                attempt
            );
        }
    }

    #[test]
    fn clamped_to_max() {
        let policy = RetryPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(1),
            factor: 2.0,
            retries: 3,
        };
        assert_eq!(policy.delay(10), Duration::from_secs(1));
    }

    #[test]
    fn first_exceeds_max() {
        let policy = RetryPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 2.0,
            retries: 3,
        };
        assert_eq!(policy.delay(0), Duration::from_secs(5));
    }

    #[test]
    fn non_finite_overflow_clamps_to_max() {
        let policy = RetryPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            retries: 3,
        };
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(10));
    }
}

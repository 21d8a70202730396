//! Retry policy with capped exponential backoff.

use std::time::Duration;

use rand::Rng;

/// Default number of attempts per call (the first try plus two retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How the dispatcher retries transient failures.
///
/// The delay before retry `n` (1-based) is
/// `initial_backoff * multiplier^(n-1)`, capped at `max_backoff`. With
/// jitter enabled the actual delay is drawn uniformly from the upper half
/// of that value.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
    /// Randomize delays so concurrent callers do not retry in lockstep.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Set the total number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the cap on a single delay.
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Set the growth factor. Values below 1.0 are clamped to 1.0.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Attempts actually allowed by this policy (at least one).
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let nanos = self.initial_backoff.as_nanos() as f64 * self.multiplier.powi(exponent);
        let capped = nanos.min(self.max_backoff.as_nanos() as f64).max(0.0);
        Duration::from_nanos(capped.round() as u64)
    }

    /// Delay before retry number `retry`, with jitter applied if enabled.
    pub fn delay<R: Rng + ?Sized>(&self, retry: u32, rng: &mut R) -> Duration {
        let base = self.base_delay(retry);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let half = base / 2;
        half + half.mul_f64(rng.random_range(0.0..=1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(policy.attempts(), 3);
        assert!(policy.jitter);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::default().with_max_attempts(0);
        assert_eq!(policy.attempts(), 1);
        assert_eq!(RetryPolicy::no_retry().attempts(), 1);
    }

    #[test]
    fn test_base_delay_grows_and_caps() {
        let policy = RetryPolicy::default()
            .with_initial_backoff(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(700));

        assert_eq!(policy.base_delay(1), Duration::from_millis(100));
        assert_eq!(policy.base_delay(2), Duration::from_millis(200));
        assert_eq!(policy.base_delay(3), Duration::from_millis(400));
        assert_eq!(policy.base_delay(4), Duration::from_millis(700));
        assert_eq!(policy.base_delay(60), Duration::from_millis(700));
    }

    #[test]
    fn test_multiplier_clamped() {
        let policy = RetryPolicy::default()
            .with_multiplier(0.5)
            .with_initial_backoff(Duration::from_millis(100));
        assert_eq!(policy.multiplier, 1.0);
        assert_eq!(policy.base_delay(5), Duration::from_millis(100));

        let policy = RetryPolicy::default().with_multiplier(f64::NAN);
        assert_eq!(policy.multiplier, 1.0);
    }

    #[test]
    fn test_jitter_stays_in_upper_half() {
        let policy = RetryPolicy::default()
            .with_initial_backoff(Duration::from_millis(200))
            .with_max_backoff(Duration::from_secs(10));
        let mut rng = StdRng::seed_from_u64(7);

        for retry in 1..6 {
            let base = policy.base_delay(retry);
            for _ in 0..50 {
                let d = policy.delay(retry, &mut rng);
                assert!(d >= base / 2, "{d:?} below half of {base:?}");
                assert!(d <= base, "{d:?} above {base:?}");
            }
        }
    }

    #[test]
    fn test_no_jitter_is_exact() {
        let policy = RetryPolicy::default().with_jitter(false);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.delay(2, &mut rng), policy.base_delay(2));
    }
}

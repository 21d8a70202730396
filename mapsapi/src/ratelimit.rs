//! In-process request pacing.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::error::Result;

/// Spaces request starts at least `1 / requests_per_second` apart.
///
/// Shared by every call made through one [`Context`](crate::Context).
/// Only the next free slot is tracked; nothing survives the process.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter. Returns `None` when `requests_per_second` is zero.
    pub fn new(requests_per_second: u32) -> Option<Self> {
        if requests_per_second == 0 {
            return None;
        }
        Some(Self {
            interval: Duration::from_secs(1) / requests_per_second,
            next_slot: Mutex::new(None),
        })
    }

    /// Minimum spacing between two request starts.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reserve the next slot and wait for it.
    ///
    /// The reservation is taken under the lock; the wait happens outside it
    /// and is interrupted by `cancel`.
    pub fn acquire(&self, cancel: &CancelToken) -> Result<()> {
        cancel.check()?;
        let wait = self.reserve(Instant::now());
        if !wait.is_zero() {
            tracing::trace!(wait_ms = wait.as_millis() as u64, "Rate limit wait");
            cancel.sleep(wait)?;
        }
        Ok(())
    }

    /// Claim a slot at or after `now`; returns how long to wait for it.
    fn reserve(&self, now: Instant) -> Duration {
        let mut next = self
            .next_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = match *next {
            Some(t) if t > now => t,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot - now
    }
}

//! Caller-side cancellation for blocking calls.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{MapsError, Result};

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Cancellation signal and optional deadline for a call.
///
/// Clones share the same signal: cancelling one cancels all of them and
/// wakes any retry backoff that is currently sleeping on it.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use mapsapi::CancelToken;
///
/// let token = CancelToken::with_timeout(Duration::from_secs(10));
/// let results = request.get_with_cancel(&ctx, &token)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token with no deadline that only fires on [`cancel`](Self::cancel).
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            inner: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// A token that fires `timeout` from now.
    ///
    /// A timeout too large to represent as an [`Instant`] means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    /// Whether the token was cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        let flagged = *self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        flagged || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail with [`MapsError::Cancelled`] if the token has fired.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(MapsError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, returning early with [`MapsError::Cancelled`]
    /// if the token is cancelled or the deadline falls inside the sleep.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        // `None` means the wake time overflowed: sleep until cancelled.
        let wake_at = Instant::now().checked_add(duration);
        let (until, hits_deadline) = match (self.deadline, wake_at) {
            (Some(d), Some(w)) if d < w => (Some(d), true),
            (Some(d), None) => (Some(d), true),
            (_, w) => (w, false),
        };

        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        loop {
            if *cancelled {
                return Err(MapsError::Cancelled);
            }
            cancelled = match until {
                Some(until) => {
                    let now = Instant::now();
                    if now >= until {
                        break;
                    }
                    self.inner
                        .wake
                        .wait_timeout(cancelled, until - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .inner
                    .wake
                    .wait(cancelled)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }

        if hits_deadline {
            Err(MapsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

//! Sliding-window request throttle.
//!
//! Counts request timestamps inside a trailing window. When the window is
//! full, the caller sleeps until the oldest timestamp leaves it. Unlike a
//! token bucket, a full burst of `max_requests` is allowed immediately and
//! the next request waits for the whole window to roll over.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Cancelled;

/// Requests per window in [`RateLimiter::default_api`].
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Window length in [`RateLimiter::default_api`].
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Sliding-window rate limiter shared by the calls to one API.
///
/// # Thread Safety
///
/// The timestamp queue sits behind a mutex that is only held for
/// bookkeeping. Waiting happens outside the lock, so concurrent callers are
/// not serialized while they sleep.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `window`.
    ///
    /// A `max_requests` of zero is treated as one.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            max_requests,
            window,
            timestamps: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Ten requests per second, a conservative default for time tracking APIs.
    pub fn default_api() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }

    pub const fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Waits until a request fits in the window, then records it.
    ///
    /// Returns [`Cancelled`] if `cancel` fires while waiting. A cancelled wait
    /// records nothing and so consumes no budget.
    pub async fn wait_if_needed(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            let wait = {
                let mut timestamps = self.lock();
                let now = Instant::now();
                self.evict(&mut timestamps, now);
                match self.wait_time(&timestamps, now) {
                    None => {
                        timestamps.push_back(now);
                        return Ok(());
                    }
                    Some(wait) => wait,
                }
            };

            debug!(?wait, max_requests = self.max_requests, "rate limit reached, waiting");
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("rate limit wait cancelled");
                    return Err(Cancelled);
                }
                () = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Requests counted in the current window.
    pub fn current_request_count(&self) -> usize {
        let mut timestamps = self.lock();
        self.evict(&mut timestamps, Instant::now());
        timestamps.len()
    }

    /// How long a call made now would wait.
    pub fn estimated_wait_time(&self) -> Duration {
        let mut timestamps = self.lock();
        let now = Instant::now();
        self.evict(&mut timestamps, now);
        self.wait_time(&timestamps, now).unwrap_or(Duration::ZERO)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // The queue is always left consistent, so a poisoned lock is usable.
        self.timestamps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops timestamps that are `window` or more in the past.
    fn evict(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        while timestamps
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(*oldest) >= self.window)
        {
            timestamps.pop_front();
        }
    }

    fn wait_time(&self, timestamps: &VecDeque<Instant>, now: Instant) -> Option<Duration> {
        if timestamps.len() < self.max_requests {
            return None;
        }
        let oldest = timestamps.front()?;
        Some(self.window.saturating_sub(now.saturating_duration_since(*oldest)))
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::default_api()
    }
}

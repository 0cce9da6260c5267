//! Fixed-window rate limiter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{BoardkitError, Result};

use super::clock::{Clock, SystemClock};
use super::rule::SharedRule;
use super::stats::RateLimitStats;
use super::target::RateLimitTarget;

/// Fixed-window request counter per rate limit target.
///
/// One atomic counter per target plus one shared window-start timestamp.
/// Counters are incremented with CAS-style atomics and reset in place at
/// window boundaries; the reset is idempotent, so concurrent callers racing
/// on a stale window can all trigger it harmlessly. Concurrent increments
/// can briefly push a counter past its limit before rejection kicks in,
/// which is accepted: only approximate fairness within a window is required.
pub struct RateLimiter {
    rule: Arc<SharedRule>,
    requests: [AtomicU64; RateLimitTarget::ALL.len()],
    last_reset_at: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(rule: Arc<SharedRule>) -> Self {
        Self::with_clock(rule, Arc::new(SystemClock))
    }

    pub fn with_clock(rule: Arc<SharedRule>, clock: Arc<dyn Clock>) -> Self {
        let last_reset = last_window_reset(clock.now_ms(), rule.window_size_ms());
        Self {
            rule,
            requests: std::array::from_fn(|_| AtomicU64::new(0)),
            last_reset_at: AtomicU64::new(last_reset),
            clock,
        }
    }

    /// Admit or reject one request against `target`.
    ///
    /// Rolls the window over first when the computed window start has moved,
    /// then resolves the effective limit: an unlimited target falls back to
    /// the global target, and an unlimited global target admits
    /// unconditionally. Rejection carries the stats the caller should
    /// surface as retry metadata.
    pub fn try_consume(&self, target: RateLimitTarget) -> Result<()> {
        let last_reset = last_window_reset(self.clock.now_ms(), self.rule.window_size_ms());
        if self.last_reset_at.load(Ordering::SeqCst) != last_reset {
            self.last_reset_at.store(last_reset, Ordering::SeqCst);
            self.reset_requests();
            debug!(window_start = last_reset, "rate limit window rolled over");
        }

        self.consume(target)
    }

    /// Stats for a target under the current window, following the same
    /// global-fallback rule as [`try_consume`].
    ///
    /// [`try_consume`]: RateLimiter::try_consume
    pub fn stats(&self, target: RateLimitTarget) -> RateLimitStats {
        let window_size = self.rule.window_size_ms();
        let next_reset = last_window_reset(self.clock.now_ms(), window_size) + window_size;

        let limit = self.rule.limit(target);
        if limit <= 0 {
            if target == RateLimitTarget::Global {
                return RateLimitStats::unlimited(next_reset);
            }
            return self.stats(RateLimitTarget::Global);
        }

        // Concurrent increments can briefly exceed the limit, hence the
        // clamp to zero.
        let count = self.requests[target.index()].load(Ordering::SeqCst) as i64;
        let available = (limit - count).max(0) as u64;
        RateLimitStats::of(limit as u64, available, next_reset)
    }

    fn consume(&self, target: RateLimitTarget) -> Result<()> {
        let limit = self.rule.limit(target);
        if limit <= 0 {
            if target == RateLimitTarget::Global {
                trace!(%target, "unlimited, admitted");
                return Ok(());
            }
            return self.consume(RateLimitTarget::Global);
        }

        let counter = &self.requests[target.index()];
        if counter.load(Ordering::SeqCst) >= limit as u64 {
            debug!(%target, limit, "rate limit exceeded");
            return Err(BoardkitError::RateLimitExceeded(self.stats(target)));
        }
        counter.fetch_add(1, Ordering::SeqCst);
        trace!(%target, "admitted");
        Ok(())
    }

    // Resets counters in place. Putting fresh atomics into the array instead
    // would race with concurrent increments holding the old ones.
    fn reset_requests(&self) {
        for counter in &self.requests {
            counter.store(0, Ordering::SeqCst);
        }
    }
}

fn last_window_reset(now_ms: u64, window_size_ms: u64) -> u64 {
    now_ms - now_ms % window_size_ms
}

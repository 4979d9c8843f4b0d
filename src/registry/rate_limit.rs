//! Fixed-window request counters.
//!
//! Each provider owns one [`RateLimitWindow`]. A recorded call either opens a
//! fresh window (`count = 1`, resetting `window` from now) or increments the
//! current one. There is no smoothing: a burst straddling a window boundary
//! can briefly exceed the nominal rate.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::types::RateLimit;

/// Mutable window state for one provider.
#[derive(Debug, Clone, Default)]
pub struct RateLimitWindow {
    reset_at: Option<Instant>,
    count: u32,
}

impl RateLimitWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one call at `now`.
    pub fn record(&mut self, now: Instant, limit: &RateLimit) {
        match self.reset_at {
            Some(reset_at) if now < reset_at => {
                self.count = self.count.saturating_add(1);
            }
            _ => {
                self.count = 1;
                self.reset_at = Some(now + limit.window());
            }
        }
    }

    /// Undo one [`record`](Self::record) in the window live at `now`.
    pub fn release(&mut self, now: Instant) {
        if self.reset_at.is_some_and(|reset_at| now < reset_at) {
            self.count = self.count.saturating_sub(1);
        }
    }

    /// Whether the live window at `now` has reached the quota.
    pub fn is_limited(&self, now: Instant, limit: &RateLimit) -> bool {
        self.live_count(now) >= limit.requests
    }

    /// Calls counted in the window that is live at `now` (0 once expired).
    pub fn live_count(&self, now: Instant) -> u32 {
        match self.reset_at {
            Some(reset_at) if now < reset_at => self.count,
            _ => 0,
        }
    }

    /// Snapshot for reporting.
    pub fn status(&self, now: Instant, limit: &RateLimit) -> RateLimitStatus {
        let used = self.live_count(now);
        RateLimitStatus {
            used,
            remaining: limit.requests.saturating_sub(used),
            resets_in: self
                .reset_at
                .filter(|r| now < *r)
                .map(|r| r - now),
        }
    }
}

/// Point-in-time view of a provider's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub used: u32,
    pub remaining: u32,
    /// Time until the live window closes; `None` when no window is open.
    pub resets_in: Option<Duration>,
}

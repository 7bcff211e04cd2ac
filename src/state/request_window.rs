use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Length of the sliding window the per-minute cap applies to
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Request history used to enforce the global rate limits
///
/// Two constraints are checked in order:
/// 1. at most `max_per_window` requests inside the trailing 60 seconds
/// 2. at least `min_interval` since the previous request
///
/// This type only does the bookkeeping; the gate owns the waiting.
#[derive(Debug, Clone)]
pub struct RequestWindow {
    /// Timestamps still inside the window, oldest first
    history: VecDeque<Instant>,

    /// Timestamp of the most recent request
    last_request: Option<Instant>,

    min_interval: Duration,
    max_per_window: usize,
}

impl RequestWindow {
    pub fn new(min_interval: Duration, max_per_window: usize) -> Self {
        Self {
            history: VecDeque::new(),
            last_request: None,
            min_interval,
            max_per_window: max_per_window.max(1),
        }
    }

    /// Drops timestamps that have left the trailing window
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.history.front() {
            if now.saturating_duration_since(oldest) >= RATE_WINDOW {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long a caller arriving at `now` must wait before its request
    ///
    /// Returns `None` when the request may go out immediately.
    pub fn delay_before_next(&mut self, now: Instant) -> Option<Duration> {
        self.prune(now);

        let mut wait = Duration::ZERO;

        if self.history.len() >= self.max_per_window {
            if let Some(&oldest) = self.history.front() {
                wait = (oldest + RATE_WINDOW).saturating_duration_since(now);
            }
        }

        if let Some(last) = self.last_request {
            let ready_at = last + self.min_interval;
            let earliest = now + wait;
            if ready_at > earliest {
                wait += ready_at - earliest;
            }
        }

        if wait.is_zero() {
            None
        } else {
            Some(wait)
        }
    }

    /// Records a request that is going out at `now`
    pub fn record(&mut self, now: Instant) {
        self.history.push_back(now);
        self.last_request = Some(now);
    }

    /// Number of requests currently inside the trailing window
    pub fn requests_in_window(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.history.len()
    }

    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }
}

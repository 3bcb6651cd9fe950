//! Leading + trailing rate limiter for a single input channel.
//!
//! DESIGN
//! ======
//! Time is passed in explicitly (milliseconds on the host's event timeline) so
//! the limiter is deterministic under test. The first call of a burst is
//! forwarded at once and opens a window of `interval` ms. Calls inside the
//! window overwrite a single pending value; when the window closes,
//! [`Throttle::poll`] releases that value and opens the next window. A window
//! that closes with nothing pending returns the limiter to idle.
//!
//! A call landing at or after the window end while a value is still pending
//! supersedes it: the new value goes out as the leading edge of a fresh window
//! and the stale one is dropped, so a burst spanning `D` ms forwards at most
//! `ceil(D / interval) + 1` values.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval_ms: f64,
    /// End of the current window; `None` while idle.
    window_end: Option<f64>,
    /// Latest value received inside the current window.
    pending: Option<T>,
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, window_end: None, pending: None }
    }

    #[must_use]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Offer a value at `now`. Returns it back if it should be forwarded
    /// immediately (leading edge); otherwise it is held for the trailing edge.
    /// A stale pending value from an expired window is discarded.
    pub fn call(&mut self, now: f64, value: T) -> Option<T> {
        match self.window_end {
            Some(end) if now < end => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.window_end = Some(now + self.interval_ms);
                self.pending = None;
                Some(value)
            }
        }
    }

    /// Release the trailing value if its window has closed by `now`.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        let end = self.window_end?;
        if now < end {
            return None;
        }
        match self.pending.take() {
            Some(value) => {
                self.window_end = Some(end + self.interval_ms);
                Some(value)
            }
            None => {
                self.window_end = None;
                None
            }
        }
    }

    /// When the next [`Self::poll`] can change state, if ever.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.window_end
    }

    /// Whether a value is waiting for the trailing edge.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending value and return to idle.
    pub fn cancel(&mut self) {
        self.window_end = None;
        self.pending = None;
    }
}

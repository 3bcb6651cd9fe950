//! Post-rotation cooldown gate.
//!
//! Lifting two fingers after a rotate produces a few residual pan / rotate
//! samples. The gate closes on rotate-end and reopens on its own once the
//! window has elapsed, so that noise is absorbed by time rather than by
//! guessing from event magnitudes.

#[cfg(test)]
#[path = "cooldown_test.rs"]
mod cooldown_test;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateState {
    /// Callbacks are forwarded.
    Enabled,
    /// Callbacks are withheld until the given timeline instant (ms).
    Suppressed { until: f64 },
}

#[derive(Debug, Clone)]
pub struct CooldownGate {
    state: GateState,
    window_ms: f64,
}

impl CooldownGate {
    #[must_use]
    pub fn new(window_ms: f64) -> Self {
        Self { state: GateState::Enabled, window_ms }
    }

    #[must_use]
    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Close the gate at `now`. A second rotate-end restarts the window.
    pub fn suppress(&mut self, now: f64) {
        let until = now + self.window_ms;
        tracing::debug!(until, "gesture callbacks suppressed");
        self.state = GateState::Suppressed { until };
    }

    /// Re-enable if the suppression window has run out by `now`.
    ///
    /// Returns `true` when this call performed the transition.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.state {
            GateState::Suppressed { until } if now >= until => {
                tracing::debug!(now, "gesture callbacks enabled again");
                self.state = GateState::Enabled;
                true
            }
            _ => false,
        }
    }

    /// Whether callbacks may fire at `now`, evaluated against the current state.
    pub fn is_enabled(&mut self, now: f64) -> bool {
        self.poll(now);
        self.state == GateState::Enabled
    }

    /// Pending re-enable instant, if suppressed.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        match self.state {
            GateState::Enabled => None,
            GateState::Suppressed { until } => Some(until),
        }
    }
}

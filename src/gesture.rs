//! Gesture input: boundary decoding and the throttled pan / rotate controller.
//!
//! Raw recognizer payloads are decoded once by [`GestureDecoder`] into
//! [`GestureEvent`]; nothing downstream looks at the raw shape. The
//! [`GestureController`] owns one [`Throttle`] per continuous channel (pan and
//! rotate-change), the rotation baseline, and the [`CooldownGate`] that closes
//! on rotate-end. It returns [`GestureCommand`]s for the host to apply.
//!
//! All instants are milliseconds on the host's single event timeline. The
//! host feeds events through [`GestureController::handle`] and arms one timer
//! for [`GestureController::next_deadline`], calling
//! [`GestureController::advance`] when it fires.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::cooldown::CooldownGate;
use crate::error::ArError;
use crate::throttle::Throttle;

// =============================================================================
// RAW PAYLOADS
// =============================================================================

/// Recognizer payload as delivered by the host, before decoding.
///
/// `kind` is the recognizer event name (`pan`, `panend`, `rotatestart`,
/// `rotate`, `rotateend`, ...). Pointer fields are CSS pixels; `delta_*` is the
/// displacement from where the pointer went down; `rotation` is degrees.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGesture {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_x: f64,
    pub client_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub rotation: f64,
}

/// Size of the surface the pointer coordinates are relative to (CSS px).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Map a pixel position into `[0, 1]²`, clamping stray edge samples.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn normalize(&self, client_x: f64, client_y: f64) -> (f32, f32) {
        let x = (client_x / self.width).clamp(0.0, 1.0);
        let y = (client_y / self.height).clamp(0.0, 1.0);
        (x as f32, y as f32)
    }
}

// =============================================================================
// DECODED EVENTS
// =============================================================================

/// A gesture after boundary decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// One-finger pan at a normalized screen position.
    PanDelta { x: f32, y: f32 },
    /// Two-finger rotation began at `angle` degrees.
    RotateStart { angle: f64 },
    /// Two-finger rotation now reads `angle` degrees.
    RotateChange { angle: f64 },
    /// Two-finger rotation ended.
    RotateEnd,
}

/// Decodes raw payloads, enforcing the pan recognition threshold.
#[derive(Debug, Clone)]
pub struct GestureDecoder {
    threshold_px: f64,
    /// A pan passed the threshold and stays recognized until the pointer lifts.
    pan_recognized: bool,
}

impl GestureDecoder {
    #[must_use]
    pub fn new(threshold_px: f64) -> Self {
        Self { threshold_px, pan_recognized: false }
    }

    /// Decode one payload. `Ok(None)` means the payload is valid but carries no
    /// event (sub-threshold pan, pointer release).
    ///
    /// # Errors
    ///
    /// Returns [`ArError::InvalidGesture`] for unknown kinds, non-finite
    /// numbers, or an empty viewport.
    pub fn decode(&mut self, raw: &RawGesture, viewport: Viewport) -> Result<Option<GestureEvent>, ArError> {
        match raw.kind.as_str() {
            "panstart" | "pan" | "panmove" => {
                if !(viewport.width > 0.0 && viewport.height > 0.0) {
                    return Err(ArError::InvalidGesture(format!(
                        "viewport {}x{} has no area",
                        viewport.width, viewport.height
                    )));
                }
                finite(raw.client_x, "clientX")?;
                finite(raw.client_y, "clientY")?;
                finite(raw.delta_x, "deltaX")?;
                finite(raw.delta_y, "deltaY")?;
                if !self.pan_recognized {
                    if raw.delta_x.hypot(raw.delta_y) < self.threshold_px {
                        return Ok(None);
                    }
                    self.pan_recognized = true;
                }
                let (x, y) = viewport.normalize(raw.client_x, raw.client_y);
                Ok(Some(GestureEvent::PanDelta { x, y }))
            }
            "panend" | "pancancel" => {
                self.pan_recognized = false;
                Ok(None)
            }
            "rotatestart" => Ok(Some(GestureEvent::RotateStart { angle: finite(raw.rotation, "rotation")? })),
            "rotate" | "rotatemove" => Ok(Some(GestureEvent::RotateChange { angle: finite(raw.rotation, "rotation")? })),
            "rotateend" | "rotatecancel" => Ok(Some(GestureEvent::RotateEnd)),
            other => Err(ArError::InvalidGesture(format!("unknown gesture type '{other}'"))),
        }
    }
}

fn finite(value: f64, field: &str) -> Result<f64, ArError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArError::InvalidGesture(format!("{field} is not finite")))
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Forwarded gesture intent for the placement layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommand {
    /// Move the object to the surface under this normalized point.
    Pan { x: f32, y: f32 },
    /// Rotate the object by this many degrees (baseline minus current angle).
    Rotate { delta_deg: f64 },
}

/// Snapshot of the suppression state, for hosts and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleWindow {
    pub enabled: bool,
    pub baseline_angle: f64,
    pub reenable_at: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    pan: Throttle<(f32, f32)>,
    rotate: Throttle<f64>,
    gate: CooldownGate,
    /// Angle of the previous rotate sample within the current gesture.
    baseline_angle: f64,
    pan_subscribed: bool,
    rotate_subscribed: bool,
}

impl GestureController {
    /// Controller with throttle interval `throttle_ms` and a post-rotation
    /// cooldown of `cooldown_ms`. No channel is subscribed yet.
    #[must_use]
    pub fn new(throttle_ms: f64, cooldown_ms: f64) -> Self {
        Self {
            pan: Throttle::new(throttle_ms),
            rotate: Throttle::new(throttle_ms),
            gate: CooldownGate::new(cooldown_ms),
            baseline_angle: 0.0,
            pan_subscribed: false,
            rotate_subscribed: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.throttle_ms, config.cooldown_ms())
    }

    // --- Subscriptions ---

    pub fn subscribe_pan(&mut self) {
        self.pan_subscribed = true;
    }

    pub fn subscribe_rotate(&mut self) {
        self.rotate_subscribed = true;
    }

    /// Detach both channels, dropping anything waiting on a trailing edge.
    pub fn unsubscribe_all(&mut self) {
        self.pan_subscribed = false;
        self.rotate_subscribed = false;
        self.pan.cancel();
        self.rotate.cancel();
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.pan_subscribed || self.rotate_subscribed
    }

    // --- Timeline ---

    /// Dispatch one decoded event at `now`.
    ///
    /// Trailing edges that fell due strictly before `now` are released first,
    /// so returned commands are in timeline order.
    pub fn handle(&mut self, event: GestureEvent, now: f64) -> Vec<GestureCommand> {
        let mut out = Vec::new();
        self.fire_due(now, false, &mut out);
        self.gate.poll(now);

        match event {
            GestureEvent::PanDelta { x, y } => {
                if self.pan_subscribed {
                    if let Some(point) = self.pan.call(now, (x, y)) {
                        self.forward_pan(now, point, &mut out);
                    }
                }
            }
            GestureEvent::RotateStart { angle } => {
                if self.rotate_subscribed {
                    tracing::debug!(angle, "rotate start");
                    self.baseline_angle = angle;
                }
            }
            GestureEvent::RotateChange { angle } => {
                if self.rotate_subscribed {
                    if let Some(angle) = self.rotate.call(now, angle) {
                        self.forward_rotate(now, angle, &mut out);
                    }
                }
            }
            GestureEvent::RotateEnd => {
                if self.rotate_subscribed {
                    tracing::debug!(now, "rotate end");
                    self.gate.suppress(now);
                }
            }
        }
        out
    }

    /// Release every trailing edge and cooldown expiry due at or before `now`.
    pub fn advance(&mut self, now: f64) -> Vec<GestureCommand> {
        let mut out = Vec::new();
        self.fire_due(now, true, &mut out);
        self.gate.poll(now);
        out
    }

    /// Earliest instant at which [`Self::advance`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        [self.pan.next_deadline(), self.rotate.next_deadline(), self.gate.deadline()]
            .into_iter()
            .flatten()
            .reduce(f64::min)
    }

    // --- Queries ---

    /// Suppression state as of `now`, whether or not a timer has fired yet.
    #[must_use]
    pub fn window(&self, now: f64) -> ThrottleWindow {
        let reenable_at = self.gate.deadline().filter(|until| now < *until);
        ThrottleWindow { enabled: reenable_at.is_none(), baseline_angle: self.baseline_angle, reenable_at }
    }

    #[must_use]
    pub fn baseline_angle(&self) -> f64 {
        self.baseline_angle
    }

    // --- Internals ---

    /// Fire trailing edges in deadline order. Each one consults the gate as it
    /// stands at its own deadline, not when its value was queued.
    fn fire_due(&mut self, now: f64, inclusive: bool, out: &mut Vec<GestureCommand>) {
        let due = |deadline: f64| if inclusive { deadline <= now } else { deadline < now };
        loop {
            let pan_at = self.pan.next_deadline().filter(|d| due(*d));
            let rotate_at = self.rotate.next_deadline().filter(|d| due(*d));
            match (pan_at, rotate_at) {
                (Some(p), Some(r)) if r < p => self.fire_rotate(r, out),
                (Some(p), _) => self.fire_pan(p, out),
                (None, Some(r)) => self.fire_rotate(r, out),
                (None, None) => break,
            }
        }
    }

    fn fire_pan(&mut self, at: f64, out: &mut Vec<GestureCommand>) {
        if let Some(point) = self.pan.poll(at) {
            self.forward_pan(at, point, out);
        }
    }

    fn fire_rotate(&mut self, at: f64, out: &mut Vec<GestureCommand>) {
        if let Some(angle) = self.rotate.poll(at) {
            self.forward_rotate(at, angle, out);
        }
    }

    fn forward_pan(&mut self, at: f64, (x, y): (f32, f32), out: &mut Vec<GestureCommand>) {
        if self.gate.is_enabled(at) {
            out.push(GestureCommand::Pan { x, y });
        } else {
            tracing::debug!(at, x, y, "pan withheld during cooldown");
        }
    }

    fn forward_rotate(&mut self, at: f64, angle: f64, out: &mut Vec<GestureCommand>) {
        if self.gate.is_enabled(at) {
            let delta_deg = self.baseline_angle - angle;
            self.baseline_angle = angle;
            out.push(GestureCommand::Rotate { delta_deg });
        } else {
            tracing::debug!(at, angle, "rotate withheld during cooldown");
        }
    }
}

//! Surface hit-test placement of the model and its shadow proxy.
//!
//! A normalized screen point is ray-cast into tracked geometry by the
//! [`Display`]; the nearest hit's transform becomes the model's anchor. The
//! shadow receiver is lifted to the hit's height so the model's shadow lands
//! on the detected surface.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::OFFSCREEN_SPAWN;
use crate::error::ArError;
use crate::platform::{Display, ModelHandle};

/// One candidate surface intersection. Hit-test results arrive nearest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Column-major anchor transform of the intersection.
    pub model_matrix: Mat4,
}

impl HitResult {
    #[must_use]
    pub fn new(model_matrix: Mat4) -> Self {
        Self { model_matrix }
    }

    /// Build from the 16-float column-major array the platform reports.
    #[must_use]
    pub fn from_cols_array(values: &[f32; 16]) -> Self {
        Self { model_matrix: Mat4::from_cols_array(values) }
    }

    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.model_matrix.w_axis.truncate()
    }

    #[must_use]
    pub fn orientation(&self) -> Quat {
        let (_, rotation, _) = self.model_matrix.to_scale_rotation_translation();
        rotation
    }
}

/// Position, orientation and scale of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform {
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Horizontal shadow receiver that follows the surface height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShadowProxy {
    pub y: f32,
}

/// Live transform of the placed model and its shadow proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementState {
    pub object: Transform,
    pub shadow: ShadowProxy,
    /// Set by the first accepted hit; the position is meaningless before it.
    pub anchored: bool,
}

impl Default for PlacementState {
    fn default() -> Self {
        Self {
            object: Transform { position: Vec3::splat(OFFSCREEN_SPAWN), ..Transform::default() },
            shadow: ShadowProxy::default(),
            anchored: false,
        }
    }
}

impl PlacementState {
    /// Anchored position, or `None` before the first successful placement.
    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        self.anchored.then_some(self.object.position)
    }
}

/// Owner of the model handle and the placement state it drives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Placement {
    model: Option<ModelHandle>,
    state: PlacementState,
}

impl Placement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the loaded model. Its scale carries over into the placed transform.
    pub fn attach_model(&mut self, model: ModelHandle) {
        self.state.object.scale = Vec3::splat(model.scale);
        self.model = Some(model);
    }

    #[must_use]
    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    /// Move the model toward the surface under `(x, y)`.
    ///
    /// `x`, `y` are normalized screen coordinates and are clamped to `[0, 1]`;
    /// `easing` is clamped likewise (1 snaps onto the hit, 0 leaves the model
    /// where it is). The hit orientation is copied only when
    /// `apply_orientation` is set. Returns the model's new position.
    ///
    /// # Errors
    ///
    /// - [`ArError::ModelNotReady`] if no model is attached; nothing is queried.
    /// - [`ArError::InvalidGesture`] for non-finite inputs.
    /// - [`ArError::NoHit`] if the hit-test is empty; state is untouched.
    pub fn try_place_at<D: Display + ?Sized>(
        &mut self,
        display: &D,
        x: f32,
        y: f32,
        easing: f32,
        apply_orientation: bool,
    ) -> Result<Vec3, ArError> {
        if self.model.is_none() {
            return Err(ArError::ModelNotReady);
        }
        if !(x.is_finite() && y.is_finite() && easing.is_finite()) {
            return Err(ArError::InvalidGesture(format!("placement input ({x}, {y}, easing {easing}) is not finite")));
        }
        let (x, y) = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
        let easing = easing.clamp(0.0, 1.0);

        let hits = display.hit_test(x, y);
        let Some(hit) = hits.first() else {
            return Err(ArError::NoHit { x, y });
        };

        let target = hit.translation();
        self.state.shadow.y = target.y;

        let object = &mut self.state.object;
        object.position = if easing >= 1.0 { target } else { object.position.lerp(target, easing) };
        if apply_orientation {
            let rotation = hit.orientation();
            if rotation.is_finite() {
                object.rotation = if easing >= 1.0 { rotation } else { object.rotation.slerp(rotation, easing) };
            } else {
                tracing::debug!(x, y, "degenerate hit transform; orientation kept");
            }
        }
        self.state.anchored = true;

        tracing::debug!(x, y, position = ?object.position, "model placed on surface");
        Ok(object.position)
    }

    /// [`Self::try_place_at`] for gesture handlers: logs the failure and
    /// reports whether the model moved.
    pub fn place_at<D: Display + ?Sized>(
        &mut self,
        display: &D,
        x: f32,
        y: f32,
        easing: f32,
        apply_orientation: bool,
    ) -> bool {
        match self.try_place_at(display, x, y, easing, apply_orientation) {
            Ok(_) => true,
            Err(ArError::NoHit { x, y }) => {
                tracing::debug!(x, y, "no surface under point");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "placement skipped");
                false
            }
        }
    }

    /// Rotate the model about its own vertical axis; position is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ArError::ModelNotReady`] if no model is attached.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rotate_y(&mut self, delta_deg: f64) -> Result<(), ArError> {
        if self.model.is_none() {
            return Err(ArError::ModelNotReady);
        }
        let turn = Quat::from_rotation_y(delta_deg.to_radians() as f32);
        self.state.object.rotation = (self.state.object.rotation * turn).normalize();
        Ok(())
    }
}

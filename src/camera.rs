//! Virtual camera kept in sync with the device pose.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::CAMERA_FOV_DEG;

/// Device pose and projection for one display frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub position: Vec3,
    pub orientation: Quat,
    /// Projection reported by the device, when it provides one.
    pub projection: Option<Mat4>,
    pub depth_near: f32,
    pub depth_far: f32,
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            projection: None,
            depth_near: 0.01,
            depth_far: 100.0,
        }
    }
}

/// Perspective camera rendered over the passthrough layer.
///
/// The projection follows the device's physical camera whenever a matrix is
/// supplied; otherwise it is derived from `fov_deg`, `aspect` and the depth
/// planes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualCamera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub orientation: Quat,
    pub projection: Mat4,
    /// Most recent device-supplied projection, preferred over the derived one.
    device_projection: Option<Mat4>,
}

impl VirtualCamera {
    #[must_use]
    pub fn new(aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_deg: CAMERA_FOV_DEG,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            projection: Mat4::IDENTITY,
            device_projection: None,
        };
        camera.update_projection();
        camera
    }

    /// Pick up the device's latest depth planes and projection.
    pub fn refresh_projection(&mut self, pose: &PoseFrame) {
        self.near = pose.depth_near;
        self.far = pose.depth_far;
        if pose.projection.is_some() {
            self.device_projection = pose.projection;
        }
        self.update_projection();
    }

    /// Move the camera to the device's tracked position and orientation.
    pub fn apply_pose(&mut self, pose: &PoseFrame) {
        self.position = pose.position;
        self.orientation = pose.orientation;
    }

    /// Track a viewport resize.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.update_projection();
    }

    /// Recompute `projection` from the current parameters.
    pub fn update_projection(&mut self) {
        self.projection = match self.device_projection {
            Some(matrix) => matrix,
            None => Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far),
        };
    }

    /// World-to-camera transform for the current pose.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }
}

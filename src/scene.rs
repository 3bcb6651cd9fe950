//! Scene handed to the renderer each frame.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use glam::Vec3;
use serde::Serialize;

use crate::consts::{
    AMBIENT_COLOR, AMBIENT_INTENSITY, LIGHT_INTENSITY, LIGHT_POSITION, SHADOW_COLOR, SHADOW_OPACITY, SHADOW_PLANE_SIZE,
};
use crate::placement::Placement;

/// Horizontal plane that only shows received shadows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShadowPlane {
    pub size: f32,
    pub color: u32,
    pub opacity: f32,
}

impl Default for ShadowPlane {
    fn default() -> Self {
        Self { size: SHADOW_PLANE_SIZE, color: SHADOW_COLOR, opacity: SHADOW_OPACITY }
    }
}

/// Ambient fill plus one shadow-casting directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightRig {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub directional_casts_shadow: bool,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: AMBIENT_COLOR,
            ambient_intensity: AMBIENT_INTENSITY,
            directional_intensity: LIGHT_INTENSITY,
            directional_position: Vec3::from_array(LIGHT_POSITION),
            directional_casts_shadow: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    pub placement: Placement,
    pub shadow_plane: ShadowPlane,
    pub lights: LightRig,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

//! Shared numeric constants for the placement core.

// ── Gestures ────────────────────────────────────────────────────

/// Minimum interval between forwarded pan / rotate callbacks, in milliseconds.
pub const DEFAULT_THROTTLE_MS: f64 = 30.0;

/// Extra suppression after a rotation ends, on top of the throttle interval.
pub const COOLDOWN_PAD_MS: f64 = 100.0;

/// Pointer travel in pixels before a pan is recognized.
pub const PAN_THRESHOLD_PX: f64 = 20.0;

// ── Model ───────────────────────────────────────────────────────

pub const DEFAULT_MODEL_OBJ: &str = "./assets/ArcticFox_Posed.obj";
pub const DEFAULT_MODEL_MTL: &str = "./assets/ArcticFox_Posed.mtl";

/// Uniform scale applied to the loaded model.
pub const DEFAULT_MODEL_SCALE: f32 = 0.1;

/// Coordinate on every axis where the model waits before its first placement.
pub const OFFSCREEN_SPAWN: f32 = 10_000.0;

/// Easing used by pan placement; 1.0 snaps straight to the hit.
pub const DEFAULT_EASING: f32 = 1.0;

/// Startup re-runs allowed after a rendering context failure.
pub const DEFAULT_MAX_CONTEXT_RESTARTS: u32 = 3;

// ── Camera ──────────────────────────────────────────────────────

/// Vertical field of view (degrees) used until the device supplies a projection.
pub const CAMERA_FOV_DEG: f32 = 60.0;

// ── Scene dressing ──────────────────────────────────────────────

/// Edge length of the horizontal shadow receiver plane.
pub const SHADOW_PLANE_SIZE: f32 = 2000.0;
pub const SHADOW_COLOR: u32 = 0x11_11_11;
pub const SHADOW_OPACITY: f32 = 0.15;

/// Untextured model materials render black without fill light.
pub const AMBIENT_COLOR: u32 = 0xff_ff_ff;
pub const AMBIENT_INTENSITY: f32 = 1.0;

pub const LIGHT_INTENSITY: f32 = 0.3;
pub const LIGHT_POSITION: [f32; 3] = [10.0, 15.0, 10.0];

//! Session configuration parsed from environment variables or host JSON.
//!
//! Every field has a default from [`crate::consts`]. Two entry points:
//!
//! - [`SessionConfig::from_env`] for native hosts that embed the core (desktop
//!   viewers, replay harnesses). The process environment is empty on
//!   `wasm32-unknown-unknown`, so the browser bridge never calls it.
//! - [`SessionConfig::from_json`] for the browser bridge, which passes the
//!   page's JSON object; missing keys keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{
    COOLDOWN_PAD_MS, DEFAULT_EASING, DEFAULT_MAX_CONTEXT_RESTARTS, DEFAULT_MODEL_MTL, DEFAULT_MODEL_OBJ,
    DEFAULT_MODEL_SCALE, DEFAULT_THROTTLE_MS, PAN_THRESHOLD_PX,
};
use crate::error::ArError;

/// Asset paths and the uniform scale applied after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub obj_path: String,
    pub mtl_path: String,
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            obj_path: DEFAULT_MODEL_OBJ.to_string(),
            mtl_path: DEFAULT_MODEL_MTL.to_string(),
            scale: DEFAULT_MODEL_SCALE,
        }
    }
}

/// How gesture-driven placement moves the model onto a hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Interpolation factor toward the hit: 1 snaps, 0 never moves.
    pub easing: f32,
    /// Copy the hit orientation onto the model as well as its translation.
    pub apply_orientation: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { easing: DEFAULT_EASING, apply_orientation: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum spacing of forwarded pan / rotate callbacks (ms).
    pub throttle_ms: f64,
    /// Added to `throttle_ms` to form the post-rotation cooldown (ms).
    pub cooldown_pad_ms: f64,
    /// Pointer travel before a pan is recognized (px).
    pub pan_threshold_px: f64,
    pub model: ModelConfig,
    pub placement: PlacementConfig,
    /// Pipeline re-runs allowed after a rendering context failure.
    pub max_context_restarts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE_MS,
            cooldown_pad_ms: COOLDOWN_PAD_MS,
            pan_threshold_px: PAN_THRESHOLD_PX,
            model: ModelConfig::default(),
            placement: PlacementConfig::default(),
            max_context_restarts: DEFAULT_MAX_CONTEXT_RESTARTS,
        }
    }
}

impl SessionConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `ARPLACE_THROTTLE_MS`: default 30
    /// - `ARPLACE_COOLDOWN_PAD_MS`: default 100
    /// - `ARPLACE_PAN_THRESHOLD_PX`: default 20
    /// - `ARPLACE_MODEL_OBJ` / `ARPLACE_MODEL_MTL`: bundled fox model
    /// - `ARPLACE_MODEL_SCALE`: default 0.1
    /// - `ARPLACE_EASING`: default 1
    /// - `ARPLACE_APPLY_ORIENTATION`: default false
    /// - `ARPLACE_MAX_CONTEXT_RESTARTS`: default 3
    ///
    /// Unparseable values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ArError::Config`] when a parsed value fails [`Self::validate`].
    pub fn from_env() -> Result<Self, ArError> {
        let defaults = Self::default();
        let config = Self {
            throttle_ms: env_parse("ARPLACE_THROTTLE_MS", defaults.throttle_ms),
            cooldown_pad_ms: env_parse("ARPLACE_COOLDOWN_PAD_MS", defaults.cooldown_pad_ms),
            pan_threshold_px: env_parse("ARPLACE_PAN_THRESHOLD_PX", defaults.pan_threshold_px),
            model: ModelConfig {
                obj_path: std::env::var("ARPLACE_MODEL_OBJ").unwrap_or(defaults.model.obj_path),
                mtl_path: std::env::var("ARPLACE_MODEL_MTL").unwrap_or(defaults.model.mtl_path),
                scale: env_parse("ARPLACE_MODEL_SCALE", defaults.model.scale),
            },
            placement: PlacementConfig {
                easing: env_parse("ARPLACE_EASING", defaults.placement.easing),
                apply_orientation: env_parse("ARPLACE_APPLY_ORIENTATION", defaults.placement.apply_orientation),
            },
            max_context_restarts: env_parse("ARPLACE_MAX_CONTEXT_RESTARTS", defaults.max_context_restarts),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a (possibly partial) JSON object; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ArError::Config`] for malformed JSON or values that fail validation.
    pub fn from_json(raw: &str) -> Result<Self, ArError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ArError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Post-rotation suppression window: throttle interval plus pad.
    #[must_use]
    pub fn cooldown_ms(&self) -> f64 {
        self.throttle_ms + self.cooldown_pad_ms
    }

    /// Reject values the core cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ArError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ArError> {
        if !self.throttle_ms.is_finite() || self.throttle_ms < 0.0 {
            return Err(ArError::Config(format!("throttle_ms must be >= 0, got {}", self.throttle_ms)));
        }
        if !self.cooldown_pad_ms.is_finite() || self.cooldown_pad_ms < 0.0 {
            return Err(ArError::Config(format!(
                "cooldown_pad_ms must be >= 0, got {}",
                self.cooldown_pad_ms
            )));
        }
        if !self.pan_threshold_px.is_finite() || self.pan_threshold_px < 0.0 {
            return Err(ArError::Config(format!(
                "pan_threshold_px must be >= 0, got {}",
                self.pan_threshold_px
            )));
        }
        if !self.model.scale.is_finite() || self.model.scale <= 0.0 {
            return Err(ArError::Config(format!("model.scale must be > 0, got {}", self.model.scale)));
        }
        if !(0.0..=1.0).contains(&self.placement.easing) {
            return Err(ArError::Config(format!(
                "placement.easing must be within [0, 1], got {}",
                self.placement.easing
            )));
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

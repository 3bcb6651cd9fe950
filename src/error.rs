//! Error type shared by every fallible operation in the crate.

/// Failures surfaced by startup, placement and gesture decoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArError {
    /// No AR-capable display was discovered.
    #[error("could not find AR display")]
    NoDisplay,
    /// Placement attempted before the model finished loading.
    #[error("model not yet loaded")]
    ModelNotReady,
    /// The hit-test found no tracked surface under the point.
    #[error("hit-test found no surface at ({x}, {y})")]
    NoHit { x: f32, y: f32 },
    /// The rendering context could not be created.
    #[error("rendering context creation failed: {0}")]
    ContextCreationFailure(String),
    /// The asset loader rejected the model.
    #[error("model load failed: {0}")]
    AssetLoad(String),
    /// A raw gesture payload could not be decoded.
    #[error("invalid gesture payload: {0}")]
    InvalidGesture(String),
    /// Configuration value rejected during parsing or validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ArError {
    /// Whether this failure re-runs the startup pipeline instead of halting it.
    #[must_use]
    pub fn is_restartable(&self) -> bool {
        matches!(self, Self::ContextCreationFailure(_))
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

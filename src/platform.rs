//! Collaborator seams: AR display, renderer, and asset loader.
//!
//! The core never rasterizes, parses assets, or talks to device APIs itself.
//! Hosts implement these traits (the `web` feature binds them to browser
//! objects; tests bind them to recording fakes).

use serde::{Deserialize, Serialize};

use crate::camera::{PoseFrame, VirtualCamera};
use crate::error::ArError;
use crate::placement::HitResult;
use crate::scene::Scene;

/// Platform token for one scheduled frame callback.
pub type FrameRequestId = u32;

/// An AR-capable display: pose source, frame scheduler, and hit-tester.
pub trait Display {
    /// Ray-cast from a normalized screen point; nearest hit first.
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult>;

    /// Latest device pose and projection.
    fn pose(&self) -> PoseFrame;

    /// Ask for a callback on the next display frame. `None` means the
    /// session can no longer deliver frames.
    fn request_next_frame(&mut self) -> Option<FrameRequestId>;

    /// Withdraw a request made by [`Display::request_next_frame`].
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Discovers the AR display at startup.
#[allow(async_fn_in_trait)]
pub trait DisplayProvider {
    type Display: Display;

    /// Resolve the AR display, or `None` if the platform has none.
    async fn discover_display(&mut self) -> Option<Self::Display>;

    /// Tell the user this device or browser cannot run the experience.
    fn show_unsupported(&mut self);
}

/// The 3D engine that composites passthrough and virtual content.
pub trait Renderer {
    fn clear_color(&mut self);

    /// Draw the device camera feed.
    fn render_passthrough(&mut self);

    fn clear_depth(&mut self);

    /// Draw the virtual scene from `camera`.
    fn render(&mut self, scene: &Scene, camera: &VirtualCamera);

    /// Track a viewport resize (CSS px).
    fn set_size(&mut self, width: u32, height: u32);
}

/// Creates the rendering context bound to a display.
pub trait RendererFactory<D: Display> {
    type Renderer: Renderer;

    /// # Errors
    ///
    /// [`ArError::ContextCreationFailure`] when the context cannot be created;
    /// startup treats that as restartable.
    fn create_renderer(&mut self, display: &D) -> Result<Self::Renderer, ArError>;
}

/// Loads a model by its geometry and material paths.
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    /// Resolve the model or reject with a message.
    async fn load_model(&mut self, obj_path: &str, mtl_path: &str) -> Result<ModelHandle, String>;
}

/// Engine-side reference to a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Engine node id.
    pub id: u32,
    /// Meshes in the model's group.
    pub mesh_count: usize,
    pub scale: f32,
    /// Whether every mesh in the group casts a shadow.
    pub cast_shadow: bool,
}

impl ModelHandle {
    /// Handle as a loader returns it: unit scale, no shadows.
    #[must_use]
    pub fn new(id: u32, mesh_count: usize) -> Self {
        Self { id, mesh_count, scale: 1.0, cast_shadow: false }
    }

    /// Apply uniform scale and turn on shadow casting for all meshes.
    #[must_use]
    pub fn prepared(self, scale: f32) -> Self {
        Self { scale, cast_shadow: true, ..self }
    }
}

//! Recording fakes for the collaborator traits, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use crate::camera::{PoseFrame, VirtualCamera};
use crate::error::ArError;
use crate::placement::HitResult;
use crate::platform::{AssetLoader, Display, DisplayProvider, FrameRequestId, ModelHandle, Renderer, RendererFactory};
use crate::scene::Scene;

pub(crate) fn hit_at(x: f32, y: f32, z: f32) -> HitResult {
    HitResult::new(Mat4::from_translation(Vec3::new(x, y, z)))
}

pub(crate) fn hit_with_rotation(translation: Vec3, rotation: Quat) -> HitResult {
    HitResult::new(Mat4::from_rotation_translation(rotation, translation))
}

// =============================================================================
// DISPLAY
// =============================================================================

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeDisplay {
    pub hits: Vec<HitResult>,
    pub pose: PoseFrame,
    /// Frames the display will still schedule; `None` is unlimited.
    pub frames_left: Option<u32>,
    pub next_id: FrameRequestId,
    pub requested: Vec<FrameRequestId>,
    pub cancelled: Vec<FrameRequestId>,
    pub hit_queries: Cell<usize>,
    pub last_query: Cell<Option<(f32, f32)>>,
}

impl FakeDisplay {
    pub fn with_hits(hits: Vec<HitResult>) -> Self {
        Self { hits, ..Self::default() }
    }

    pub fn last_requested(&self) -> Option<FrameRequestId> {
        self.requested.last().copied()
    }
}

impl Display for FakeDisplay {
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult> {
        self.hit_queries.set(self.hit_queries.get() + 1);
        self.last_query.set(Some((x, y)));
        self.hits.clone()
    }

    fn pose(&self) -> PoseFrame {
        self.pose
    }

    fn request_next_frame(&mut self) -> Option<FrameRequestId> {
        if let Some(left) = self.frames_left {
            if left == 0 {
                return None;
            }
            self.frames_left = Some(left - 1);
        }
        self.next_id += 1;
        self.requested.push(self.next_id);
        Some(self.next_id)
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.cancelled.push(id);
    }
}

pub(crate) struct FakeProvider {
    pub display: Option<FakeDisplay>,
    pub discoveries: usize,
    pub unsupported_shown: usize,
}

impl FakeProvider {
    pub fn new(display: Option<FakeDisplay>) -> Self {
        Self { display, discoveries: 0, unsupported_shown: 0 }
    }
}

impl DisplayProvider for FakeProvider {
    type Display = FakeDisplay;

    async fn discover_display(&mut self) -> Option<FakeDisplay> {
        self.discoveries += 1;
        self.display.clone()
    }

    fn show_unsupported(&mut self) {
        self.unsupported_shown += 1;
    }
}

// =============================================================================
// RENDERER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderCall {
    ClearColor,
    Passthrough,
    ClearDepth,
    Render { model_position: Vec3, camera_position: Vec3, projection: Mat4 },
    SetSize(u32, u32),
}

pub(crate) type RenderLog = Rc<RefCell<Vec<RenderCall>>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRenderer {
    pub log: RenderLog,
}

impl Renderer for FakeRenderer {
    fn clear_color(&mut self) {
        self.log.borrow_mut().push(RenderCall::ClearColor);
    }

    fn render_passthrough(&mut self) {
        self.log.borrow_mut().push(RenderCall::Passthrough);
    }

    fn clear_depth(&mut self) {
        self.log.borrow_mut().push(RenderCall::ClearDepth);
    }

    fn render(&mut self, scene: &Scene, camera: &VirtualCamera) {
        self.log.borrow_mut().push(RenderCall::Render {
            model_position: scene.placement.state().object.position,
            camera_position: camera.position,
            projection: camera.projection,
        });
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().push(RenderCall::SetSize(width, height));
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeFactory {
    /// Context creations that fail before one succeeds.
    pub failures_left: u32,
    pub attempts: usize,
    pub log: RenderLog,
}

impl RendererFactory<FakeDisplay> for FakeFactory {
    type Renderer = FakeRenderer;

    fn create_renderer(&mut self, _display: &FakeDisplay) -> Result<FakeRenderer, ArError> {
        self.attempts += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(ArError::ContextCreationFailure("Error creating WebGL context.".into()));
        }
        Ok(FakeRenderer { log: Rc::clone(&self.log) })
    }
}

// =============================================================================
// ASSETS
// =============================================================================

pub(crate) struct FakeLoader {
    pub result: Result<ModelHandle, String>,
    pub requests: Vec<(String, String)>,
}

impl FakeLoader {
    pub fn ok() -> Self {
        Self { result: Ok(ModelHandle::new(7, 3)), requests: Vec::new() }
    }

    pub fn failing(message: &str) -> Self {
        Self { result: Err(message.to_string()), requests: Vec::new() }
    }
}

impl AssetLoader for FakeLoader {
    async fn load_model(&mut self, obj_path: &str, mtl_path: &str) -> Result<ModelHandle, String> {
        self.requests.push((obj_path.to_string(), mtl_path.to_string()));
        self.result.clone()
    }
}

//! Per-frame render and pose update driver.
//!
//! The driver is `Idle` until [`FrameLoop::start`] schedules the first display
//! frame, and `Running` while exactly one request is outstanding. Each frame
//! callback runs [`FrameLoop::tick`], which composites the camera passthrough
//! before the virtual scene and then schedules the next frame. If the display
//! stops handing out frames the loop drops back to `Idle`; it never retries.

#[cfg(test)]
#[path = "frame_loop_test.rs"]
mod frame_loop_test;

use crate::camera::VirtualCamera;
use crate::platform::{Display, FrameRequestId, Renderer};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    /// Waiting on the display to call back with `pending`.
    Running { pending: FrameRequestId },
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Frames rendered since construction.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Schedule the first frame. Returns `false` if already running or the
    /// display refused to schedule.
    pub fn start<D: Display>(&mut self, display: &mut D) -> bool {
        if self.is_running() {
            tracing::debug!("render loop already running");
            return false;
        }
        match display.request_next_frame() {
            Some(pending) => {
                tracing::info!(pending, "render loop started");
                self.state = LoopState::Running { pending };
                true
            }
            None => {
                tracing::warn!("display refused first frame; render loop not started");
                false
            }
        }
    }

    /// Cancel the outstanding frame request and go idle.
    pub fn stop<D: Display>(&mut self, display: &mut D) {
        if let LoopState::Running { pending } = self.state {
            display.cancel_frame(pending);
            tracing::info!(frames = self.frames, "render loop stopped");
        }
        self.state = LoopState::Idle;
    }

    /// Display callback for request `id`. Stale or unexpected ids are ignored.
    ///
    /// Returns `true` if a frame was rendered.
    pub fn on_frame<D: Display, R: Renderer>(
        &mut self,
        id: FrameRequestId,
        display: &mut D,
        renderer: &mut R,
        scene: &Scene,
        camera: &mut VirtualCamera,
    ) -> bool {
        match self.state {
            LoopState::Running { pending } if pending == id => {
                self.tick(display, renderer, scene, camera);
                true
            }
            _ => {
                tracing::debug!(id, state = ?self.state, "ignoring stale frame callback");
                false
            }
        }
    }

    /// Render one frame and, while running, schedule the next.
    ///
    /// Order: clear color, passthrough, projection refresh, pose, clear depth,
    /// virtual scene. Depth is cleared only after the passthrough so the
    /// previous virtual pass cannot occlude the camera feed.
    pub fn tick<D: Display, R: Renderer>(
        &mut self,
        display: &mut D,
        renderer: &mut R,
        scene: &Scene,
        camera: &mut VirtualCamera,
    ) {
        renderer.clear_color();
        renderer.render_passthrough();

        let pose = display.pose();
        camera.refresh_projection(&pose);
        camera.apply_pose(&pose);

        renderer.clear_depth();
        renderer.render(scene, camera);
        self.frames += 1;

        if !self.is_running() {
            return;
        }
        match display.request_next_frame() {
            Some(pending) => self.state = LoopState::Running { pending },
            None => {
                tracing::warn!(frames = self.frames, "display stopped delivering frames; render loop idle");
                self.state = LoopState::Idle;
            }
        }
    }
}

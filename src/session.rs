//! Startup entry point and the live interaction session.
//!
//! ARCHITECTURE
//! ============
//! [`Session::start`] acquires the display, creates the rendering context,
//! loads and prepares the model, and kicks off the render loop. A rendering
//! context failure re-runs the whole pipeline (bounded by
//! `max_context_restarts`); every other startup failure halts.
//!
//! Once running, the session is the single owner of placement state. It
//! starts in [`InteractionMode::TapToPlace`]: the first tap that finds a
//! surface anchors the model, detaches the tap listener, and subscribes the
//! pan / rotate channels ([`InteractionMode::DragMove`]). All callbacks (taps,
//! gestures, timers, frames) arrive on one timeline and run to completion.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::camera::VirtualCamera;
use crate::config::SessionConfig;
use crate::error::ArError;
use crate::frame_loop::FrameLoop;
use crate::gesture::{GestureCommand, GestureController, GestureDecoder, RawGesture, Viewport};
use crate::placement::PlacementState;
use crate::platform::{AssetLoader, Display, DisplayProvider, FrameRequestId, ModelHandle, Renderer, RendererFactory};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Waiting for a tap to spawn the model on a surface.
    TapToPlace,
    /// Model anchored; pan moves it, two-finger rotate turns it.
    DragMove,
}

#[derive(Debug)]
pub struct Session<D: Display, R: Renderer> {
    config: SessionConfig,
    display: D,
    renderer: R,
    scene: Scene,
    camera: VirtualCamera,
    frame_loop: FrameLoop,
    decoder: GestureDecoder,
    gestures: GestureController,
    mode: InteractionMode,
    viewport: Viewport,
}

impl<D: Display, R: Renderer> Session<D, R> {
    /// Run the startup pipeline, re-running it after context failures.
    ///
    /// # Errors
    ///
    /// - [`ArError::NoDisplay`] after the unsupported message is shown.
    /// - [`ArError::ContextCreationFailure`] once restarts are exhausted.
    /// - [`ArError::AssetLoad`] if the model is rejected.
    pub async fn start<P, F, L>(
        provider: &mut P,
        factory: &mut F,
        loader: &mut L,
        config: SessionConfig,
        viewport: Viewport,
    ) -> Result<Self, ArError>
    where
        P: DisplayProvider<Display = D>,
        F: RendererFactory<D, Renderer = R>,
        L: AssetLoader,
    {
        config.validate()?;
        let mut restarts = 0;
        loop {
            match Self::bootstrap(provider, factory, loader, &config, viewport).await {
                Ok(session) => return Ok(session),
                Err(e) if e.is_restartable() && restarts < config.max_context_restarts => {
                    restarts += 1;
                    tracing::warn!(error = %e, restarts, "restarting startup pipeline");
                }
                Err(e) => {
                    tracing::error!(error = %e, "startup failed");
                    return Err(e);
                }
            }
        }
    }

    async fn bootstrap<P, F, L>(
        provider: &mut P,
        factory: &mut F,
        loader: &mut L,
        config: &SessionConfig,
        viewport: Viewport,
    ) -> Result<Self, ArError>
    where
        P: DisplayProvider<Display = D>,
        F: RendererFactory<D, Renderer = R>,
        L: AssetLoader,
    {
        let Some(mut display) = provider.discover_display().await else {
            provider.show_unsupported();
            return Err(ArError::NoDisplay);
        };
        let renderer = factory.create_renderer(&display)?;

        let pose = display.pose();
        let camera = VirtualCamera::new(aspect(viewport), pose.depth_near, pose.depth_far);

        let model = load_model(loader, config).await?;
        let mut scene = Scene::new();
        scene.placement.attach_model(model);

        let mut frame_loop = FrameLoop::new();
        frame_loop.start(&mut display);

        tracing::info!(
            throttle_ms = config.throttle_ms,
            cooldown_ms = config.cooldown_ms(),
            "session started"
        );
        Ok(Self {
            config: config.clone(),
            display,
            renderer,
            scene,
            camera,
            frame_loop,
            decoder: GestureDecoder::new(config.pan_threshold_px),
            gestures: GestureController::from_config(config),
            mode: InteractionMode::TapToPlace,
            viewport,
        })
    }

    // --- Input ---

    /// Tap at a pixel position. Only listened to in tap-to-place mode; a tap
    /// that lands on a surface switches the session to drag-move.
    pub fn on_tap(&mut self, client_x: f64, client_y: f64) -> bool {
        if self.mode != InteractionMode::TapToPlace {
            return false;
        }
        let (x, y) = self.viewport.normalize(client_x, client_y);
        let apply_orientation = self.config.placement.apply_orientation;
        if !self.scene.placement.place_at(&self.display, x, y, 1.0, apply_orientation) {
            return false;
        }
        self.mode = InteractionMode::DragMove;
        self.gestures.subscribe_pan();
        self.gestures.subscribe_rotate();
        tracing::info!(x, y, "model spawned; drag-move enabled");
        true
    }

    /// Decode and dispatch a raw recognizer payload at timeline instant `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ArError::InvalidGesture`] if the payload cannot be decoded.
    pub fn on_gesture(&mut self, raw: &RawGesture, now: f64) -> Result<(), ArError> {
        let Some(event) = self.decoder.decode(raw, self.viewport)? else {
            return Ok(());
        };
        let commands = self.gestures.handle(event, now);
        self.apply(commands);
        Ok(())
    }

    /// Timer callback: release due trailing edges and cooldown expiry.
    pub fn advance(&mut self, now: f64) {
        let commands = self.gestures.advance(now);
        self.apply(commands);
    }

    /// When the host should next call [`Self::advance`].
    #[must_use]
    pub fn next_timer_deadline(&self) -> Option<f64> {
        self.gestures.next_deadline()
    }

    // --- Frames ---

    /// Display frame callback.
    pub fn on_frame(&mut self, id: FrameRequestId) -> bool {
        self.frame_loop
            .on_frame(id, &mut self.display, &mut self.renderer, &self.scene, &mut self.camera)
    }

    /// Viewport resize: camera aspect, projection, renderer size.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        self.viewport = Viewport::new(width, height);
        let (w, h) = (width.round() as u32, height.round() as u32);
        self.camera.set_viewport(w, h);
        self.renderer.set_size(w, h);
    }

    /// Tear down: cancel the pending frame and detach gesture channels.
    pub fn stop(&mut self) {
        self.frame_loop.stop(&mut self.display);
        self.gestures.unsubscribe_all();
        tracing::info!("session stopped");
    }

    // --- Queries ---

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn placement(&self) -> &PlacementState {
        self.scene.placement.state()
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn camera(&self) -> &VirtualCamera {
        &self.camera
    }

    #[must_use]
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    #[must_use]
    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    // --- Internals ---

    fn apply(&mut self, commands: Vec<GestureCommand>) {
        let placement = self.config.placement;
        for command in commands {
            match command {
                GestureCommand::Pan { x, y } => {
                    self.scene
                        .placement
                        .place_at(&self.display, x, y, placement.easing, placement.apply_orientation);
                }
                GestureCommand::Rotate { delta_deg } => {
                    if let Err(e) = self.scene.placement.rotate_y(delta_deg) {
                        tracing::warn!(error = %e, "rotation skipped");
                    }
                }
            }
        }
    }
}

/// Load the model and apply scale and shadow flags.
async fn load_model<L: AssetLoader>(loader: &mut L, config: &SessionConfig) -> Result<ModelHandle, ArError> {
    let model = loader
        .load_model(&config.model.obj_path, &config.model.mtl_path)
        .await
        .map_err(ArError::AssetLoad)?;
    tracing::info!(id = model.id, meshes = model.mesh_count, scale = config.model.scale, "model loaded");
    Ok(model.prepared(config.model.scale))
}

#[allow(clippy::cast_possible_truncation)]
fn aspect(viewport: Viewport) -> f32 {
    if viewport.width > 0.0 && viewport.height > 0.0 {
        (viewport.width / viewport.height) as f32
    } else {
        1.0
    }
}

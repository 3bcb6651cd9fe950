//! Browser bridge: binds the collaborator traits to host JavaScript objects.
//!
//! The host page hands [`ArApp::start`] one `platform` object:
//!
//! | Member | Contract |
//! |--------|----------|
//! | `getDisplay()` | Promise of the AR display, or `null` when unsupported |
//! | `showUnsupported()` | Shows the unsupported-browser message |
//! | `createRenderer(display)` | Returns a renderer; throws if the GL context fails |
//! | `loadModel(obj, mtl)` | Promise of `{ id, meshCount }` |
//!
//! The display exposes `hitTest(x, y)` (array of `{ modelMatrix }`),
//! `getPose()` (`{ position, orientation, projectionMatrix? }`), `depthNear`,
//! `depthFar`, `requestAnimationFrame(cb)` and `cancelAnimationFrame(id)`.
//! The renderer exposes `clearColor()`, `renderPassthrough()`, `clearDepth()`,
//! `render(frame)` and `setSize(width, height)`; `frame` is a plain object
//! carrying the scene, camera and the model's world matrix.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};
use js_sys::{Array, Float32Array, Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::camera::{PoseFrame, VirtualCamera};
use crate::config::SessionConfig;
use crate::error::ArError;
use crate::gesture::{RawGesture, Viewport};
use crate::placement::HitResult;
use crate::platform::{AssetLoader, Display, DisplayProvider, FrameRequestId, ModelHandle, Renderer, RendererFactory};
use crate::scene::Scene;
use crate::session::Session;

type WebSession = Session<JsDisplay, JsRenderer>;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        tracing::debug!(error = %e, "console logger already installed");
    }
}

// =============================================================================
// JS HELPERS
// =============================================================================

fn get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
}

fn call(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let func: Function = get(target, name)?.dyn_into()?;
    func.apply(target, &args.iter().collect::<Array>())
}

fn number(target: &JsValue, key: &str) -> Option<f64> {
    match get(target, key) {
        Ok(value) => value.as_f64(),
        Err(_) => None,
    }
}

fn floats(target: &JsValue, key: &str) -> Vec<f32> {
    match get(target, key) {
        Ok(value) if value.is_object() => Float32Array::new(&value).to_vec(),
        _ => Vec::new(),
    }
}

fn message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    match get(err, "message") {
        Ok(text) => text.as_string().unwrap_or_else(|| format!("{err:?}")),
        Err(_) => format!("{err:?}"),
    }
}

fn to_js(err: ArError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

// =============================================================================
// DISPLAY
// =============================================================================

pub struct JsDisplay {
    inner: JsValue,
    frame_fn: Function,
    /// Most recent frame request, read back by the frame callback.
    last_request: Rc<Cell<FrameRequestId>>,
}

impl Display for JsDisplay {
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult> {
        let args = [JsValue::from_f64(f64::from(x)), JsValue::from_f64(f64::from(y))];
        let hits = match call(&self.inner, "hitTest", &args) {
            Ok(hits) if Array::is_array(&hits) => Array::from(&hits),
            Ok(_) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %message(&e), "hitTest failed");
                return Vec::new();
            }
        };
        hits.iter()
            .filter_map(|hit| match <[f32; 16]>::try_from(floats(&hit, "modelMatrix").as_slice()) {
                Ok(cols) => Some(HitResult::from_cols_array(&cols)),
                Err(_) => None,
            })
            .collect()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pose(&self) -> PoseFrame {
        let mut pose = PoseFrame::default();
        if let Some(near) = number(&self.inner, "depthNear") {
            pose.depth_near = near as f32;
        }
        if let Some(far) = number(&self.inner, "depthFar") {
            pose.depth_far = far as f32;
        }
        let raw = match call(&self.inner, "getPose", &[]) {
            Ok(raw) if raw.is_object() => raw,
            _ => return pose,
        };
        let position = floats(&raw, "position");
        if position.len() == 3 {
            pose.position = Vec3::from_slice(&position);
        }
        let orientation = floats(&raw, "orientation");
        if orientation.len() == 4 {
            pose.orientation = Quat::from_slice(&orientation).normalize();
        }
        let projection = floats(&raw, "projectionMatrix");
        if projection.len() == 16 {
            pose.projection = Some(Mat4::from_cols_slice(&projection));
        }
        pose
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn request_next_frame(&mut self) -> Option<FrameRequestId> {
        match call(&self.inner, "requestAnimationFrame", &[JsValue::from(self.frame_fn.clone())]) {
            Ok(id) => {
                let id = id.as_f64()? as FrameRequestId;
                self.last_request.set(id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!(error = %message(&e), "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if let Err(e) = call(&self.inner, "cancelAnimationFrame", &[JsValue::from(id)]) {
            tracing::warn!(error = %message(&e), id, "cancelAnimationFrame failed");
        }
    }
}

// =============================================================================
// RENDERER
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FramePayload<'a> {
    scene: &'a Scene,
    camera: &'a VirtualCamera,
    model_matrix: Mat4,
    view_matrix: Mat4,
}

pub struct JsRenderer {
    inner: JsValue,
}

impl JsRenderer {
    fn invoke(&self, name: &str, args: &[JsValue]) {
        if let Err(e) = call(&self.inner, name, args) {
            tracing::warn!(error = %message(&e), method = name, "renderer call failed");
        }
    }
}

impl Renderer for JsRenderer {
    fn clear_color(&mut self) {
        self.invoke("clearColor", &[]);
    }

    fn render_passthrough(&mut self) {
        self.invoke("renderPassthrough", &[]);
    }

    fn clear_depth(&mut self) {
        self.invoke("clearDepth", &[]);
    }

    fn render(&mut self, scene: &Scene, camera: &VirtualCamera) {
        let payload = FramePayload {
            scene,
            camera,
            model_matrix: scene.placement.state().object.matrix(),
            view_matrix: camera.view_matrix(),
        };
        let frame = match serde_json::to_string(&payload) {
            Ok(json) => js_sys::JSON::parse(&json),
            Err(e) => {
                tracing::warn!(error = %e, "frame payload serialization failed");
                return;
            }
        };
        match frame {
            Ok(frame) => self.invoke("render", &[frame]),
            Err(e) => tracing::warn!(error = %message(&e), "frame payload rejected"),
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.invoke("setSize", &[JsValue::from(width), JsValue::from(height)]);
    }
}

// =============================================================================
// PLATFORM ADAPTERS
// =============================================================================

struct JsProvider {
    platform: JsValue,
    frame_fn: Function,
    last_request: Rc<Cell<FrameRequestId>>,
}

impl DisplayProvider for JsProvider {
    type Display = JsDisplay;

    async fn discover_display(&mut self) -> Option<JsDisplay> {
        let promise = match call(&self.platform, "getDisplay", &[]) {
            Ok(promise) => promise,
            Err(e) => {
                tracing::warn!(error = %message(&e), "getDisplay failed");
                return None;
            }
        };
        match JsFuture::from(Promise::resolve(&promise)).await {
            Ok(display) if display.is_object() => Some(JsDisplay {
                inner: display,
                frame_fn: self.frame_fn.clone(),
                last_request: Rc::clone(&self.last_request),
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %message(&e), "display discovery rejected");
                None
            }
        }
    }

    fn show_unsupported(&mut self) {
        if let Err(e) = call(&self.platform, "showUnsupported", &[]) {
            tracing::warn!(error = %message(&e), "showUnsupported failed");
        }
    }
}

struct JsRendererFactory {
    platform: JsValue,
}

impl RendererFactory<JsDisplay> for JsRendererFactory {
    type Renderer = JsRenderer;

    fn create_renderer(&mut self, display: &JsDisplay) -> Result<JsRenderer, ArError> {
        call(&self.platform, "createRenderer", &[display.inner.clone()])
            .map(|inner| JsRenderer { inner })
            .map_err(|e| ArError::ContextCreationFailure(message(&e)))
    }
}

struct JsLoader {
    platform: JsValue,
}

impl AssetLoader for JsLoader {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn load_model(&mut self, obj_path: &str, mtl_path: &str) -> Result<ModelHandle, String> {
        let args = [JsValue::from_str(obj_path), JsValue::from_str(mtl_path)];
        let promise = call(&self.platform, "loadModel", &args).map_err(|e| message(&e))?;
        let model = JsFuture::from(Promise::resolve(&promise))
            .await
            .map_err(|e| message(&e))?;
        let id = number(&model, "id").unwrap_or_default() as u32;
        let mesh_count = number(&model, "meshCount").unwrap_or_default() as usize;
        Ok(ModelHandle::new(id, mesh_count))
    }
}

// =============================================================================
// EXPORTED APP
// =============================================================================

struct AppInner {
    session: RefCell<Option<WebSession>>,
    frame_closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    /// Bumped whenever the gesture timer is re-armed; older timeouts no-op.
    timer_generation: Cell<u64>,
}

/// Handle returned to the page once startup resolves.
#[wasm_bindgen]
pub struct ArApp {
    inner: Rc<AppInner>,
}

#[wasm_bindgen]
impl ArApp {
    /// Run startup. Rejects with the error message when no AR display is
    /// available, the model fails to load, or context restarts run out.
    pub async fn start(platform: JsValue, config_json: Option<String>, width: f64, height: f64) -> Result<ArApp, JsValue> {
        let config = match config_json {
            Some(raw) => SessionConfig::from_json(&raw).map_err(to_js)?,
            None => SessionConfig::default(),
        };

        let inner = Rc::new(AppInner {
            session: RefCell::new(None),
            frame_closure: RefCell::new(None),
            timer_generation: Cell::new(0),
        });
        let last_request = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&inner);
        let pending = Rc::clone(&last_request);
        let closure = Closure::wrap(Box::new(move |_ts: f64| {
            if let Some(inner) = weak.upgrade() {
                if let Some(session) = inner.session.borrow_mut().as_mut() {
                    session.on_frame(pending.get());
                }
            }
        }) as Box<dyn FnMut(f64)>);
        let frame_fn: Function = closure.as_ref().unchecked_ref::<Function>().clone();
        *inner.frame_closure.borrow_mut() = Some(closure);

        let mut provider = JsProvider { platform: platform.clone(), frame_fn, last_request };
        let mut factory = JsRendererFactory { platform: platform.clone() };
        let mut loader = JsLoader { platform };
        let session = Session::start(&mut provider, &mut factory, &mut loader, config, Viewport::new(width, height))
            .await
            .map_err(to_js)?;
        *inner.session.borrow_mut() = Some(session);
        Ok(ArApp { inner })
    }

    /// Tap at CSS pixel coordinates; `true` if the model was spawned.
    #[wasm_bindgen(js_name = onTap)]
    pub fn on_tap(&self, client_x: f64, client_y: f64) -> bool {
        self.with_session(|s| s.on_tap(client_x, client_y)).unwrap_or(false)
    }

    /// Forward a recognizer event (`pan`, `panend`, `rotatestart`, `rotate`, `rotateend`).
    #[wasm_bindgen(js_name = onGesture)]
    pub fn on_gesture(
        &self,
        kind: String,
        client_x: f64,
        client_y: f64,
        delta_x: f64,
        delta_y: f64,
        rotation: f64,
    ) -> Result<(), JsValue> {
        let raw = RawGesture { kind, client_x, client_y, delta_x, delta_y, rotation };
        let result = self.with_session(|s| s.on_gesture(&raw, now_ms()));
        arm_timer(&self.inner);
        match result {
            Some(result) => result.map_err(to_js),
            None => Ok(()),
        }
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.with_session(|s| s.resize(width, height));
    }

    pub fn stop(&self) {
        self.with_session(WebSession::stop);
        self.inner.timer_generation.set(self.inner.timer_generation.get() + 1);
    }

    /// Current placement state as a plain object.
    #[wasm_bindgen(js_name = placementState)]
    pub fn placement_state(&self) -> Result<JsValue, JsValue> {
        let json = match self.inner.session.borrow().as_ref() {
            Some(session) => serde_json::to_string(session.placement()).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => return Ok(JsValue::NULL),
        };
        js_sys::JSON::parse(&json)
    }
}

impl ArApp {
    fn with_session<T>(&self, f: impl FnOnce(&mut WebSession) -> T) -> Option<T> {
        self.inner.session.borrow_mut().as_mut().map(f)
    }
}

/// Arm a single timeout for the session's next gesture deadline.
#[allow(clippy::cast_possible_truncation)]
fn arm_timer(inner: &Rc<AppInner>) {
    let generation = inner.timer_generation.get() + 1;
    inner.timer_generation.set(generation);

    let deadline = inner.session.borrow().as_ref().and_then(WebSession::next_timer_deadline);
    let Some(deadline) = deadline else {
        return;
    };
    let Some(window) = web_sys::window() else {
        tracing::warn!("no window; gesture timer not armed");
        return;
    };

    let delay = (deadline - now_ms()).max(0.0).ceil() as i32;
    let weak = Rc::downgrade(inner);
    let callback = Closure::once_into_js(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.timer_generation.get() != generation {
            return;
        }
        if let Some(session) = inner.session.borrow_mut().as_mut() {
            session.advance(now_ms());
        }
        arm_timer(&inner);
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay) {
        tracing::warn!(error = %message(&e), "setTimeout failed");
    }
}

//! Interaction core for placing a virtual model on real-world surfaces.
//!
//! The crate owns everything between a touch-screen recognizer and an AR
//! display: decoding pan / rotate gestures, throttling them and gating pans
//! behind a post-rotate cooldown, turning screen points into surface
//! placements via hit-testing, and driving the per-frame render loop that
//! composites the camera feed under the virtual scene. Platform services
//! (display, GL context, asset loading) sit behind the traits in
//! [`platform`], so the same session runs against the browser bridge or
//! in-memory fakes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Startup pipeline and the live [`session::Session`] |
//! | [`gesture`] | Gesture decoding and the [`gesture::GestureController`] |
//! | [`throttle`] | Leading + trailing edge throttle |
//! | [`cooldown`] | Post-rotate pan suppression window |
//! | [`placement`] | Surface hit-test placement of the model and shadow |
//! | [`frame_loop`] | Frame request / render driver |
//! | [`camera`] | Virtual camera fed by the device pose |
//! | [`scene`] | Scene graph: model, shadow plane, lights |
//! | [`platform`] | Display, renderer and asset loader seams |
//! | [`config`] | Session configuration from env or JSON |
//! | [`error`] | Crate error type |
//! | [`consts`] | Shared defaults (timings, model path, shadow look) |
//! | `web` | wasm-bindgen bridge to host JS objects (feature `web`) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod cooldown;
pub mod error;
pub mod frame_loop;
pub mod gesture;
pub mod placement;
pub mod platform;
pub mod scene;
pub mod session;
pub mod throttle;

#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

//! Viewport and interaction engine for the CineFlow infinite canvas.
//!
//! This crate owns everything that turns raw pointer, wheel, touch, and key
//! input into canvas state: the pan/zoom camera and its coordinate
//! conversions, the fit-to-content framing, hit-testing, and the gesture state
//! machine that moves assets around. It does no rendering and no I/O. The host
//! (browser shell or any other UI) forwards events to [`engine::EngineCore`]
//! and applies the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Engine façade and the host-facing [`engine::Action`] type |
//! | [`doc`] | Assets, the [`doc::AssetStore`] contract, and the in-memory workspace |
//! | [`camera`] | Camera state and screen/world conversions |
//! | [`viewport`] | Camera controller: pan, zoom, reset, fit |
//! | [`fit`] | Bounding-box union and the fit-to-content camera |
//! | [`input`] | Input event types and gesture states |
//! | [`gesture`] | The gesture state machine |
//! | [`hit`] | Hit-testing against assets |
//! | [`consts`] | Shared numeric constants (zoom limits, fit margin, defaults) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod fit;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod viewport;

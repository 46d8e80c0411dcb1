//! Drawing backends.
//!
//! [`text`] is always available since the [`Canvas`](crate::canvas::Canvas)
//! contract draws HUD text with it. The wgpu renderer and the winit
//! application are gated behind the `renderer` feature; without it the crate
//! runs headless only.

pub mod text;

#[cfg(feature = "renderer")]
pub mod app;
#[cfg(feature = "renderer")]
pub mod renderer;

#[cfg(feature = "renderer")]
pub use app::run_windowed;
#[cfg(feature = "renderer")]
pub use renderer::{Camera2D, QuadRenderer, Vertex};

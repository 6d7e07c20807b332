//! Rendering Adapter: renderer-agnostic interface over the simulated world.
//!
//! # Invariants
//! - Renderer cannot mutate world truth directly.
//! - Render output derives only from world state and view.

mod canvas;
mod export;
mod renderer;

pub use canvas::Canvas;
pub use export::{save_picture, write_picture};
pub use renderer::{CanvasRenderer, DebugTextRenderer, RenderView, Renderer};

/// Errors from writing rendered output.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub fn crate_info() -> &'static str {
    "jyrobot-render v0.1.0"
}

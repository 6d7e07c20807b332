//! Shared value types for the simulator workspace.
//!
//! # Invariants
//! - Colors are 8-bit RGBA; the wire form omits alpha when it is opaque.
//! - Pictures wrap `image::RgbaImage`; out-of-range writes are ignored.

mod picture;
mod types;

pub use picture::Picture;
pub use types::{Color, ColorError, Line, Point};

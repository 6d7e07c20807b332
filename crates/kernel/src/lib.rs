//! World Kernel: authoritative simulated world, robot stepping, sensing.
//!
//! # Invariants
//! - All state mutations flow through explicit operations on [`World`].
//! - Sensors and cameras read the world; they never move robots.
//! - A robot never collides with or sees its own bounding box.

pub mod geometry;
mod robot;
mod sensors;
pub mod world;

pub use geometry::Hit;
pub use robot::{Robot, MAX_TRACE_LENGTH};
pub use sensors::{Camera, CameraKind, RangeSensor, CAMERA_RANGE};
pub use world::{RayFilter, Wall, WallKind, World};

/// Errors from kernel operations addressed by index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    #[error("robot index {index} out of range (fleet has {robots} robots)")]
    InvalidIndex { index: usize, robots: usize },
    #[error("robot {robot} has no camera {camera}")]
    NoSuchCamera { robot: usize, camera: usize },
}

//! Configuration: the typed world/robot schema shared by controller and view.
//!
//! # Invariants
//! - Typed structures are canonical; JSON only exists at the synced-field boundary.
//! - Missing fields take the documented defaults; present fields are kept verbatim.
//! - Serialization is deterministic (struct field order, `Vec` order).
//! - A config that validates has bounded world and camera sizes.

mod command;
mod fleet;
mod io;
mod schema;

pub use command::Command;
pub use io::ConfigFormat;
pub use schema::{
    BoxConfig, CameraConfig, CameraSettings, DepthCameraSettings, MAX_CAMERA_SIDE, MAX_WORLD_SIDE,
    RangeSensorConfig, RobotConfig, SimConfig, WorldConfig,
};

/// Errors from parsing, validating, loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("malformed config: {0}")]
    Malformed(String),
}

pub fn crate_info() -> &'static str {
    "jyrobot-config v0.1.0"
}

use std::collections::BTreeSet;

use glam::DVec2;
use jyrobot_common::{Color, Point};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level configuration: `{"world": .., "robots": [..]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub robots: Vec<RobotConfig>,
}

impl SimConfig {
    pub fn new(world: WorldConfig, robots: Vec<RobotConfig>) -> Self {
        Self { world, robots }
    }

    /// Parse and validate a JSON config string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Compact JSON, the form stored in the synced `config` field.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a robot by name.
    pub fn robot(&self, name: &str) -> Option<&RobotConfig> {
        self.robots.iter().find(|r| r.name == name)
    }

    /// Check the structural rules the simulator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        let mut names = BTreeSet::new();
        for robot in &self.robots {
            if !names.insert(robot.name.as_str()) {
                return Err(ConfigError::Malformed(format!(
                    "duplicate robot name {:?}",
                    robot.name
                )));
            }
            robot.validate()?;
        }
        Ok(())
    }
}

/// World bounds and obstacle boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_width")]
    pub width: f64,
    #[serde(default = "default_world_height")]
    pub height: f64,
    #[serde(default)]
    pub boxes: Vec<BoxConfig>,
}

fn default_world_width() -> f64 {
    500.0
}

fn default_world_height() -> f64 {
    250.0
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_width(),
            height: default_world_height(),
            boxes: Vec::new(),
        }
    }
}

/// Largest accepted world width or height.
pub const MAX_WORLD_SIDE: f64 = 4096.0;

/// Largest accepted camera width or height, in pixels.
pub const MAX_CAMERA_SIDE: u32 = 4096;

impl WorldConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let side = |v: f64| v > 0.0 && v <= MAX_WORLD_SIDE;
        if !(side(self.width) && side(self.height)) {
            return Err(ConfigError::Malformed(format!(
                "world size {}x{} outside 0..={MAX_WORLD_SIDE}",
                self.width, self.height
            )));
        }
        for (i, b) in self.boxes.iter().enumerate() {
            if b.width() == 0.0 || b.height() == 0.0 {
                return Err(ConfigError::Malformed(format!("box {i} is degenerate")));
            }
        }
        Ok(())
    }
}

/// Axis-aligned obstacle given by two opposite corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxConfig {
    pub color: Color,
    pub p1: Point,
    pub p2: Point,
}

impl BoxConfig {
    pub fn new(color: Color, p1: Point, p2: Point) -> Self {
        Self { color, p1, p2 }
    }

    pub fn width(&self) -> f64 {
        (self.p2.x - self.p1.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.p2.y - self.p1.y).abs()
    }

    /// Corner with the smallest coordinates.
    pub fn min(&self) -> DVec2 {
        DVec2::from(self.p1).min(DVec2::from(self.p2))
    }

    /// Corner with the largest coordinates.
    pub fn max(&self) -> DVec2 {
        DVec2::from(self.p1).max(DVec2::from(self.p2))
    }
}

/// One robot: pose, body outline and attached sensors.
///
/// `direction` is in degrees. `body` is a closed polygon in robot-local
/// coordinates, written as `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotConfig {
    #[serde(default = "default_robot_name")]
    pub name: String,
    #[serde(default = "default_robot_coord")]
    pub x: f64,
    #[serde(default = "default_robot_coord")]
    pub y: f64,
    #[serde(default)]
    pub direction: f64,
    #[serde(default = "default_robot_color")]
    pub color: Color,
    #[serde(default)]
    pub body: Vec<DVec2>,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(default)]
    pub range_sensors: Vec<RangeSensorConfig>,
    /// Draw the robot's bounding square in the top-down view.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub debug: bool,
}

fn default_robot_name() -> String {
    "Robbie".into()
}

fn default_robot_coord() -> f64 {
    100.0
}

fn default_robot_color() -> Color {
    Color::rgb(255, 0, 0)
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: default_robot_name(),
            x: default_robot_coord(),
            y: default_robot_coord(),
            direction: 0.0,
            color: default_robot_color(),
            body: Vec::new(),
            cameras: Vec::new(),
            range_sensors: Vec::new(),
            debug: false,
        }
    }
}

impl RobotConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let malformed = |what: String| ConfigError::Malformed(format!("robot {:?}: {what}", self.name));
        if !self.body.is_empty() && self.body.len() < 3 {
            return Err(malformed(format!(
                "body needs at least 3 vertices, got {}",
                self.body.len()
            )));
        }
        for camera in &self.cameras {
            let lens = camera.settings();
            let side = |v: u32| (1..=MAX_CAMERA_SIDE).contains(&v);
            if !(side(lens.width) && side(lens.height)) {
                return Err(malformed(format!(
                    "camera resolution {}x{} outside 1..={MAX_CAMERA_SIDE}",
                    lens.width, lens.height
                )));
            }
            if !(0.0..=1.0).contains(&lens.colors_fade_with_distance) {
                return Err(malformed(format!(
                    "colorsFadeWithDistance {} outside 0..=1",
                    lens.colors_fade_with_distance
                )));
            }
        }
        for sensor in &self.range_sensors {
            if !(sensor.max > 0.0) {
                return Err(malformed(format!("range sensor max {} must be positive", sensor.max)));
            }
        }
        Ok(())
    }
}

/// Camera variants, tagged on the wire by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CameraConfig {
    Camera(CameraSettings),
    DepthCamera(DepthCameraSettings),
}

impl CameraConfig {
    /// Resolution, field of view and fade shared by both variants.
    pub fn settings(&self) -> &CameraSettings {
        match self {
            Self::Camera(lens) => lens,
            Self::DepthCamera(depth) => &depth.lens,
        }
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, Self::DepthCamera(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettings {
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
    /// 0 = no fade, 1 = full fade at the far edge of the world.
    #[serde(default = "default_fade")]
    pub colors_fade_with_distance: f64,
    /// Field of view in degrees.
    #[serde(default = "default_camera_angle")]
    pub angle: f64,
}

fn default_camera_width() -> u32 {
    256
}

fn default_camera_height() -> u32 {
    128
}

fn default_fade() -> f64 {
    1.0
}

fn default_camera_angle() -> f64 {
    60.0
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: default_camera_width(),
            height: default_camera_height(),
            colors_fade_with_distance: default_fade(),
            angle: default_camera_angle(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthCameraSettings {
    #[serde(flatten)]
    pub lens: CameraSettings,
    #[serde(default = "default_reflect_ground")]
    pub reflect_ground: bool,
    #[serde(default)]
    pub reflect_sky: bool,
}

fn default_reflect_ground() -> bool {
    true
}

impl Default for DepthCameraSettings {
    fn default() -> Self {
        Self {
            lens: CameraSettings::default(),
            reflect_ground: default_reflect_ground(),
            reflect_sky: false,
        }
    }
}

/// Distance-measuring beam. `direction` is in degrees relative to the robot
/// heading; `width` is the beam spread in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSensorConfig {
    #[serde(default = "default_sensor_position")]
    pub position: f64,
    #[serde(default)]
    pub direction: f64,
    #[serde(default = "default_sensor_max")]
    pub max: f64,
    #[serde(default = "default_sensor_width")]
    pub width: f64,
}

fn default_sensor_position() -> f64 {
    10.0
}

fn default_sensor_max() -> f64 {
    100.0
}

fn default_sensor_width() -> f64 {
    1.0
}

impl Default for RangeSensorConfig {
    fn default() -> Self {
        Self {
            position: default_sensor_position(),
            direction: 0.0,
            max: default_sensor_max(),
            width: default_sensor_width(),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One-shot velocity instruction for the robot at `index` in the fleet.
///
/// `vx`/`vy` are linear velocities in the robot frame, `va` the turn rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub index: usize,
    pub vx: f64,
    pub vy: f64,
    pub va: f64,
}

impl Command {
    pub fn new(index: usize, vx: f64, vy: f64, va: f64) -> Self {
        Self { index, vx, vy, va }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

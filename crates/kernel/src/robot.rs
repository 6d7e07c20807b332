use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::DVec2;
use jyrobot_common::{Color, Line};
use jyrobot_config::{Command, RobotConfig};

use crate::geometry::{outline, rotate_around};
use crate::sensors::{Camera, RangeSensor};

/// Number of past positions kept for drawing the trail.
pub const MAX_TRACE_LENGTH: usize = 1000;

/// Half diagonal of the square used for collision.
const BOUNDING_RADIUS: f64 = 10.0;

/// A simulated differential robot.
///
/// Pose is `position` plus `direction` in radians. Velocities are applied
/// once per [`World::update`](crate::World::update) call: `vx`/`vy` in the
/// robot frame, `va` as a heading decrement.
#[derive(Debug, Clone)]
pub struct Robot {
    pub name: String,
    pub color: Color,
    pub body: Vec<DVec2>,
    pub debug: bool,
    pub do_trace: bool,
    pub(crate) position: DVec2,
    pub(crate) direction: f64,
    pub(crate) vx: f64,
    pub(crate) vy: f64,
    pub(crate) va: f64,
    pub(crate) stalled: bool,
    pub(crate) time: f64,
    pub(crate) trace: VecDeque<DVec2>,
    pub(crate) bounds: [Line; 4],
    pub(crate) range_sensors: Vec<RangeSensor>,
    pub(crate) cameras: Vec<Camera>,
}

impl Robot {
    pub fn from_config(config: &RobotConfig) -> Self {
        let position = DVec2::new(config.x, config.y);
        let direction = config.direction.to_radians();
        Self {
            name: config.name.clone(),
            color: config.color,
            body: config.body.clone(),
            debug: config.debug,
            do_trace: true,
            position,
            direction,
            vx: 0.0,
            vy: 0.0,
            va: 0.0,
            stalled: false,
            time: 0.0,
            trace: VecDeque::new(),
            bounds: outline(&bounding_corners(position, direction)),
            range_sensors: config.range_sensors.iter().map(RangeSensor::from_config).collect(),
            cameras: config.cameras.iter().map(Camera::from_config).collect(),
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Heading in radians.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Velocities `(vx, vy, va)`.
    pub fn velocity(&self) -> (f64, f64, f64) {
        (self.vx, self.vy, self.va)
    }

    /// True when the last step was refused because of a collision.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Simulated time of the last step.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn trace(&self) -> impl ExactSizeIterator<Item = DVec2> + '_ {
        self.trace.iter().copied()
    }

    /// Edges of the collision square at the current pose.
    pub fn bounding_lines(&self) -> &[Line; 4] {
        &self.bounds
    }

    pub fn range_sensors(&self) -> &[RangeSensor] {
        &self.range_sensors
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn forward(&mut self, vx: f64) {
        self.vx = vx;
    }

    pub fn backward(&mut self, vx: f64) {
        self.vx = -vx;
    }

    pub fn turn(&mut self, va: f64) {
        self.va = va;
    }

    pub fn stop(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
        self.va = 0.0;
    }

    pub fn set_velocity(&mut self, vx: f64, vy: f64, va: f64) {
        self.vx = vx;
        self.vy = vy;
        self.va = va;
    }

    /// Take the velocities of a command. The index is the caller's concern.
    pub fn apply_command(&mut self, command: &Command) {
        self.set_velocity(command.vx, command.vy, command.va);
    }

    /// Move the robot without collision checks, e.g. for placement.
    pub fn set_pose(&mut self, position: DVec2, direction: f64) {
        self.position = position;
        self.direction = direction;
        self.bounds = outline(&bounding_corners(position, direction));
    }

    /// Body polygon transformed into world coordinates.
    pub fn body_outline(&self) -> Vec<DVec2> {
        let rotation = DVec2::from_angle(self.direction);
        self.body
            .iter()
            .map(|p| self.position + rotation.rotate(*p))
            .collect()
    }

    /// Pose the robot would reach this step if nothing blocks it.
    pub(crate) fn proposed_pose(&self) -> (DVec2, f64) {
        let (sin, cos) = self.direction.sin_cos();
        let tvx = self.vx * cos + self.vy * sin;
        let tvy = self.vx * sin - self.vy * cos;
        (
            self.position + DVec2::new(tvx, tvy),
            self.direction - self.va,
        )
    }

    pub(crate) fn record_trace(&mut self) {
        if !self.do_trace {
            return;
        }
        self.trace.push_back(self.position);
        if self.trace.len() > MAX_TRACE_LENGTH {
            self.trace.pop_front();
        }
    }
}

/// Corners of the collision square centred on `position`, rotated with the heading.
pub(crate) fn bounding_corners(position: DVec2, direction: f64) -> [DVec2; 4] {
    std::array::from_fn(|k| {
        rotate_around(
            position,
            BOUNDING_RADIUS,
            direction + FRAC_PI_4 + k as f64 * FRAC_PI_2,
        )
    })
}

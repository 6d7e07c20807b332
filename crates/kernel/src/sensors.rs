//! Range sensors and cameras.
//!
//! Both sample the world by ray casting from the owning robot's pose. They
//! are refreshed by [`World::update`](crate::World::update) after the robot
//! has moved.

use jyrobot_common::{Color, Picture};
use jyrobot_config::{CameraConfig, RangeSensorConfig};

use crate::geometry::{rotate_around, Hit};
use crate::world::{RayFilter, World};

/// Length of camera rays.
pub const CAMERA_RANGE: f64 = 1000.0;

const SKY: Color = Color::rgb(0, 0, 128);
const GROUND: Color = Color::rgb(0, 128, 0);

/// Height, in pixels at zero distance, of robots drawn into camera images.
const ROBOT_STRIP_HEIGHT: f64 = 30.0;

/// Distance beam that reads 1.0 when nothing is within `max`, otherwise
/// `distance / max`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSensor {
    /// Offset from the robot centre along the beam heading.
    pub position: f64,
    /// Radians, relative to the robot heading.
    pub direction: f64,
    pub max: f64,
    /// Spread of the beam in radians; zero casts a single ray.
    pub width: f64,
    reading: f64,
    distance: f64,
}

impl RangeSensor {
    pub fn from_config(config: &RangeSensorConfig) -> Self {
        Self {
            position: config.position,
            direction: config.direction.to_radians(),
            max: config.max,
            width: config.width,
            reading: 1.0,
            distance: config.max,
        }
    }

    pub fn reading(&self) -> f64 {
        self.reading
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance;
        self.reading = distance / self.max;
    }

    pub fn set_reading(&mut self, reading: f64) {
        self.reading = reading;
        self.distance = reading * self.max;
    }

    /// Ray offsets across the beam.
    fn offsets(&self) -> Vec<f64> {
        if self.width == 0.0 {
            vec![0.0]
        } else {
            vec![-self.width / 2.0, 0.0, self.width / 2.0]
        }
    }

    /// Nearest obstacle distance seen by this sensor on robot `index`,
    /// capped at `max`.
    pub(crate) fn measure(&self, world: &World, index: usize) -> f64 {
        let Some(robot) = world.robots().get(index) else {
            return self.max;
        };
        let heading = robot.direction() + self.direction;
        let origin = rotate_around(robot.position(), self.position, heading);
        self.offsets()
            .into_iter()
            .filter_map(|offset| {
                world.cast_ray(origin, heading + offset, self.max, RayFilter::AllExcept(index))
            })
            .map(|hit| hit.distance)
            .fold(self.max, f64::min)
    }
}

/// Image kind produced by a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Color,
    Depth { reflect_ground: bool, reflect_sky: bool },
}

/// Pinhole-style camera that scans one ray per image column.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub kind: CameraKind,
    pub width: usize,
    pub height: usize,
    /// 0 = no fade, 1 = full fade at the far edge of the world.
    pub colors_fade_with_distance: f64,
    /// Field of view in degrees.
    pub angle: f64,
    wall_hits: Vec<Option<Hit>>,
    robot_hits: Vec<Vec<Hit>>,
}

/// Rays recorded by one camera scan.
#[derive(Debug, Clone, Default)]
pub(crate) struct CameraScan {
    walls: Vec<Option<Hit>>,
    robots: Vec<Vec<Hit>>,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let kind = match config {
            CameraConfig::Camera(_) => CameraKind::Color,
            CameraConfig::DepthCamera(depth) => CameraKind::Depth {
                reflect_ground: depth.reflect_ground,
                reflect_sky: depth.reflect_sky,
            },
        };
        let lens = config.settings();
        let width = lens.width as usize;
        Self {
            kind,
            width,
            height: lens.height as usize,
            colors_fade_with_distance: lens.colors_fade_with_distance,
            angle: lens.angle,
            wall_hits: vec![None; width],
            robot_hits: vec![Vec::new(); width],
        }
    }

    /// Nearest static wall hit per column from the last scan.
    pub fn wall_hits(&self) -> &[Option<Hit>] {
        &self.wall_hits
    }

    /// Every other-robot hit per column from the last scan.
    pub fn robot_hits(&self) -> &[Vec<Hit>] {
        &self.robot_hits
    }

    /// Ray heading offset, in radians, for image column `i`.
    fn column_offset(&self, i: usize) -> f64 {
        let degrees = i as f64 / self.width as f64 * self.angle - self.angle / 2.0;
        degrees.to_radians()
    }

    pub(crate) fn scan(&self, world: &World, index: usize) -> CameraScan {
        let Some(robot) = world.robots().get(index) else {
            return CameraScan::default();
        };
        let origin = robot.position();
        let (walls, robots) = (0..self.width)
            .map(|i| {
                let heading = robot.direction() + self.column_offset(i);
                (
                    world.cast_ray(origin, heading, CAMERA_RANGE, RayFilter::WallsOnly),
                    world.cast_ray_robots(index, origin, heading, CAMERA_RANGE),
                )
            })
            .unzip();
        CameraScan { walls, robots }
    }

    pub(crate) fn apply(&mut self, scan: CameraScan) {
        self.wall_hits = scan.walls;
        self.robot_hits = scan.robots;
    }

    /// Render the last scan. `size` is the larger world dimension, the
    /// distance at which everything has faded to the horizon.
    pub fn take_picture(&self, size: f64) -> Picture {
        let mut pic = Picture::new(self.width, self.height);
        let rows = self.height as f64;
        let fade = self.colors_fade_with_distance;
        let horizon = rows / 2.0;
        for (i, hit) in self.wall_hits.iter().enumerate() {
            let (high, wall) = match hit {
                Some(hit) => {
                    let s = unit(1.0 - hit.distance / size);
                    let sc = unit(1.0 - hit.distance / size * fade);
                    ((1.0 - s) * rows, Some(self.shade(hit.color, sc)))
                }
                None => (0.0, None),
            };
            for j in 0..self.height {
                let row = j as f64;
                let color = if row < high / 2.0 {
                    self.sky(row, horizon)
                } else if row < rows - high / 2.0 {
                    wall
                } else {
                    self.ground(row, horizon)
                };
                if let Some(color) = color {
                    pic.set(i as i64, j as i64, color);
                }
            }
        }
        self.draw_robots(&mut pic, size);
        pic
    }

    /// Robots nearer than the wall in each column, drawn farthest first.
    fn draw_robots(&self, pic: &mut Picture, size: f64) {
        let rows = self.height as f64;
        let fade = self.colors_fade_with_distance;
        for (i, hits) in self.robot_hits.iter().enumerate() {
            let wall = self.wall_hits.get(i).copied().flatten();
            let mut hits: Vec<&Hit> = hits
                .iter()
                .filter(|hit| wall.is_none_or(|w| hit.distance <= w.distance))
                .collect();
            hits.sort_by(|a, b| b.distance.total_cmp(&a.distance));
            for hit in hits {
                let s = unit(1.0 - hit.distance / size);
                let sc = unit(1.0 - hit.distance / size * fade);
                let lift = (rows / 2.0 * (1.0 - s)).round() as i64;
                let strip = ROBOT_STRIP_HEIGHT * s;
                let color = self.shade(hit.color, sc);
                let mut j = 0_i64;
                while (j as f64) < strip {
                    pic.set(i as i64, self.height as i64 - j - 1 - lift, color);
                    j += 1;
                }
            }
        }
    }

    fn shade(&self, color: Color, sc: f64) -> Color {
        match self.kind {
            CameraKind::Color => color.scaled(sc),
            CameraKind::Depth { .. } => Color::grey_f(255.0 * sc),
        }
    }

    fn sky(&self, row: f64, horizon: f64) -> Option<Color> {
        match self.kind {
            CameraKind::Color => Some(SKY),
            CameraKind::Depth { reflect_sky, .. } => reflect_sky.then(|| {
                let sky = unit(1.0 - row / horizon * self.colors_fade_with_distance);
                Color::grey_f(255.0 - 255.0 * sky)
            }),
        }
    }

    fn ground(&self, row: f64, horizon: f64) -> Option<Color> {
        match self.kind {
            CameraKind::Color => Some(GROUND),
            CameraKind::Depth { reflect_ground, .. } => reflect_ground.then(|| {
                let ground = unit((row - horizon) / horizon * self.colors_fade_with_distance);
                Color::grey_f(255.0 * ground)
            }),
        }
    }
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use jyrobot_config::{CameraSettings, DepthCameraSettings};

    use super::*;

    fn camera(width: u32, height: u32) -> Camera {
        Camera::from_config(&CameraConfig::Camera(CameraSettings {
            width,
            height,
            ..CameraSettings::default()
        }))
    }

    fn hit_at(distance: f64, color: Color) -> Hit {
        Hit::new(DVec2::new(distance, 0.0), DVec2::ZERO, color)
    }

    #[test]
    fn sensor_starts_clear() {
        let sensor = RangeSensor::from_config(&RangeSensorConfig::default());
        assert_eq!(sensor.reading(), 1.0);
        assert_eq!(sensor.distance(), 100.0);
    }

    #[test]
    fn sensor_reading_tracks_distance() {
        let mut sensor = RangeSensor::from_config(&RangeSensorConfig {
            max: 20.0,
            ..RangeSensorConfig::default()
        });
        sensor.set_distance(5.0);
        assert_eq!(sensor.reading(), 0.25);
        sensor.set_reading(0.5);
        assert_eq!(sensor.distance(), 10.0);
    }

    #[test]
    fn sensor_beam_offsets() {
        let mut sensor = RangeSensor::from_config(&RangeSensorConfig::default());
        assert_eq!(sensor.offsets(), vec![-0.5, 0.0, 0.5]);
        sensor.width = 0.0;
        assert_eq!(sensor.offsets(), vec![0.0]);
    }

    #[test]
    fn column_offsets_span_field_of_view() {
        let cam = camera(4, 2);
        assert_eq!(cam.column_offset(0), (-30.0_f64).to_radians());
        assert_eq!(cam.column_offset(2), 0.0);
    }

    #[test]
    fn blank_scan_leaves_picture_transparent() {
        let pic = camera(3, 4).take_picture(500.0);
        assert!(pic.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn near_wall_fills_most_of_the_column() {
        let mut cam = camera(1, 10);
        cam.wall_hits = vec![Some(hit_at(50.0, Color::rgb(200, 100, 0)))];
        let pic = cam.take_picture(500.0);
        // s = 0.9: just under one row of sky, the rest is wall
        assert_eq!(pic.get(0, 0), Some(SKY));
        assert_eq!(pic.get(0, 1), Some(Color::rgb(180, 90, 0)));
        assert_eq!(pic.get(0, 9), Some(Color::rgb(180, 90, 0)));
    }

    #[test]
    fn far_wall_shows_sky_and_ground() {
        let mut cam = camera(1, 10);
        cam.wall_hits = vec![Some(hit_at(250.0, Color::grey(200)))];
        let pic = cam.take_picture(500.0);
        // s = 0.5, high = 5 rows: sky 0..=2, wall 3..=7, ground 8..
        assert_eq!(pic.get(0, 2), Some(SKY));
        assert_eq!(pic.get(0, 3), Some(Color::grey(100)));
        assert_eq!(pic.get(0, 7), Some(Color::grey(100)));
        assert_eq!(pic.get(0, 8), Some(GROUND));
    }

    #[test]
    fn robot_in_front_of_wall_is_drawn() {
        let mut cam = camera(1, 100);
        cam.wall_hits = vec![Some(hit_at(400.0, Color::WHITE))];
        cam.robot_hits = vec![vec![hit_at(0.0, Color::rgb(0, 0, 255))]];
        let pic = cam.take_picture(500.0);
        // s = 1: 30 rows from the bottom, no lift
        assert_eq!(pic.get(0, 99), Some(Color::rgb(0, 0, 255)));
        assert_eq!(pic.get(0, 70), Some(Color::rgb(0, 0, 255)));
        assert_eq!(pic.get(0, 69), Some(GROUND));
    }

    #[test]
    fn robot_behind_wall_is_hidden() {
        let mut cam = camera(1, 100);
        cam.wall_hits = vec![Some(hit_at(10.0, Color::WHITE))];
        cam.robot_hits = vec![vec![hit_at(20.0, Color::rgb(0, 0, 255))]];
        let pic = cam.take_picture(500.0);
        assert!(pic.column(0).all(|c| c != Color::rgb(0, 0, 255)));
    }

    #[test]
    fn depth_camera_is_grey() {
        let mut cam = Camera::from_config(&CameraConfig::DepthCamera(DepthCameraSettings {
            lens: CameraSettings {
                width: 1,
                height: 10,
                ..CameraSettings::default()
            },
            ..DepthCameraSettings::default()
        }));
        cam.wall_hits = vec![Some(hit_at(250.0, Color::rgb(255, 0, 0)))];
        let pic = cam.take_picture(500.0);
        // sky not reflected by default
        assert_eq!(pic.get(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(pic.get(0, 4), Some(Color::grey(128)));
        // ground row 9: (9 - 5) / 5 = 0.8
        assert_eq!(pic.get(0, 9), Some(Color::grey(204)));
    }

    #[test]
    fn depth_camera_reflects_sky_when_asked() {
        let mut cam = Camera::from_config(&CameraConfig::DepthCamera(DepthCameraSettings {
            lens: CameraSettings {
                width: 1,
                height: 10,
                ..CameraSettings::default()
            },
            reflect_ground: false,
            reflect_sky: true,
        }));
        cam.wall_hits = vec![Some(hit_at(250.0, Color::WHITE))];
        let pic = cam.take_picture(500.0);
        // row 0: sky = 1, grey 0; row 2: sky = 0.6, grey 102
        assert_eq!(pic.get(0, 0), Some(Color::grey(0)));
        assert_eq!(pic.get(0, 2), Some(Color::grey(102)));
        assert_eq!(pic.get(0, 9), Some(Color::TRANSPARENT));
    }
}

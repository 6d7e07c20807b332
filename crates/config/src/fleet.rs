use glam::DVec2;
use jyrobot_common::{Color, Point};

use crate::{
    BoxConfig, CameraConfig, CameraSettings, DepthCameraSettings, RangeSensorConfig, RobotConfig,
    SimConfig, WorldConfig,
};

/// Outline shared by the stock robots, in robot-local coordinates.
const STOCK_BODY: [[f64; 2]; 20] = [
    [4.17, 5.0],
    [4.17, 6.67],
    [5.83, 5.83],
    [5.83, 5.0],
    [7.5, 5.0],
    [7.5, -5.0],
    [5.83, -5.0],
    [5.83, -5.83],
    [4.17, -6.67],
    [4.17, -5.0],
    [-4.17, -5.0],
    [-4.17, -6.67],
    [-5.83, -5.83],
    [-6.67, -5.0],
    [-7.5, -4.17],
    [-7.5, 4.17],
    [-6.67, 5.0],
    [-5.83, 5.83],
    [-4.17, 6.67],
    [-4.17, 5.0],
];

impl SimConfig {
    /// The stock scene: a 500x250 world with four boxes and two robots,
    /// "Red" (one camera) and "Blue" (a depth camera and two cameras).
    pub fn default_fleet() -> Self {
        let world = WorldConfig {
            width: 500.0,
            height: 250.0,
            boxes: vec![
                stock_box(Color::rgb(0, 0, 0), (100.0, 0.0), (110.0, 110.0)),
                stock_box(Color::rgb(255, 0, 255), (200.0, 95.0), (210.0, 170.0)),
                stock_box(Color::rgb(255, 255, 0), (300.0, 0.0), (310.0, 95.0)),
                stock_box(Color::rgb(255, 128, 0), (300.0, 190.0), (310.0, 250.0)),
            ],
        };
        let red = RobotConfig {
            name: "Red".into(),
            x: 430.0,
            y: 50.0,
            direction: 180.0,
            color: Color::rgb(255, 0, 0),
            body: stock_body(),
            cameras: vec![CameraConfig::Camera(lens(60.0))],
            range_sensors: stock_range_sensors(),
            debug: false,
        };
        let blue = RobotConfig {
            name: "Blue".into(),
            x: 30.0,
            y: 50.0,
            direction: 0.0,
            color: Color::rgb(0, 0, 255),
            body: stock_body(),
            cameras: vec![
                CameraConfig::DepthCamera(DepthCameraSettings {
                    lens: lens(60.0),
                    ..DepthCameraSettings::default()
                }),
                CameraConfig::Camera(lens(60.0)),
                CameraConfig::Camera(lens(30.0)),
            ],
            range_sensors: stock_range_sensors(),
            debug: false,
        };
        Self::new(world, vec![red, blue])
    }
}

fn stock_box(color: Color, p1: (f64, f64), p2: (f64, f64)) -> BoxConfig {
    BoxConfig::new(color, Point::new(p1.0, p1.1), Point::new(p2.0, p2.1))
}

fn stock_body() -> Vec<DVec2> {
    STOCK_BODY.iter().map(|[x, y]| DVec2::new(*x, *y)).collect()
}

fn lens(angle: f64) -> CameraSettings {
    CameraSettings {
        width: 256,
        height: 128,
        colors_fade_with_distance: 1.0,
        angle,
    }
}

/// A narrow long-range beam straight ahead plus two wide short beams.
fn stock_range_sensors() -> Vec<RangeSensorConfig> {
    [(0.0, 100.0, 0.05), (22.5, 20.0, 1.0), (-22.5, 20.0, 1.0)]
        .into_iter()
        .map(|(direction, max, width)| RangeSensorConfig {
            position: 8.2,
            direction,
            max,
            width,
        })
        .collect()
}

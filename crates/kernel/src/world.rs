use glam::DVec2;
use jyrobot_common::{Color, Line, Picture};
use jyrobot_config::{BoxConfig, Command, SimConfig};
use tracing::{debug, info};

use crate::geometry::{intersect_hit, outline, rotate_around, segments_intersect, Hit};
use crate::robot::{bounding_corners, Robot};
use crate::KernelError;

/// What a wall is for; decides how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    /// One edge of the world border.
    Boundary,
    /// A filled obstacle.
    Obstacle,
}

/// A static wall: one or more segments sharing a color.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub kind: WallKind,
    pub color: Color,
    pub lines: Vec<Line>,
}

impl Wall {
    pub fn new(kind: WallKind, color: Color, lines: Vec<Line>) -> Self {
        Self { kind, color, lines }
    }

    /// Four-sided wall around the rectangle spanned by a box.
    pub fn from_box(config: &BoxConfig) -> Self {
        let (lo, hi) = (config.min(), config.max());
        let corners = [lo, DVec2::new(hi.x, lo.y), hi, DVec2::new(lo.x, hi.y)];
        Self::new(WallKind::Obstacle, config.color, outline(&corners).to_vec())
    }
}

/// Which outlines a ray may stop at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayFilter {
    /// Static walls only.
    WallsOnly,
    /// Static walls and every robot except the given one.
    AllExcept(usize),
}

/// The authoritative simulated world.
///
/// Static walls never change after construction. Robots are stepped in
/// fleet order, so a robot sees the poses earlier robots reached this step.
#[derive(Debug, Clone)]
pub struct World {
    width: f64,
    height: f64,
    time: f64,
    tick: u64,
    walls: Vec<Wall>,
    robots: Vec<Robot>,
    pub boundary_wall_color: Color,
    pub ground_color: Color,
}

impl World {
    /// Empty world of the given size, enclosed by boundary walls.
    pub fn new(width: f64, height: f64) -> Self {
        let boundary_wall_color = Color::rgb(128, 0, 128);
        let corners = [
            DVec2::ZERO,
            DVec2::new(0.0, height),
            DVec2::new(width, height),
            DVec2::new(width, 0.0),
        ];
        let walls = outline(&corners)
            .into_iter()
            .map(|line| Wall::new(WallKind::Boundary, boundary_wall_color, vec![line]))
            .collect();
        Self {
            width,
            height,
            time: 0.0,
            tick: 0,
            walls,
            robots: Vec::new(),
            boundary_wall_color,
            ground_color: Color::rgb(0, 128, 0),
        }
    }

    /// Build the world and fleet described by a config.
    pub fn from_config(config: &SimConfig) -> Self {
        let mut world = Self::new(config.world.width, config.world.height);
        for b in &config.world.boxes {
            world.add_box(b);
        }
        for robot in &config.robots {
            world.add_robot(Robot::from_config(robot));
        }
        info!(
            width = world.width,
            height = world.height,
            walls = world.walls.len(),
            robots = world.robots.len(),
            "world built"
        );
        world
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The larger of width and height; distance at which camera colors fade out.
    pub fn size(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Simulated time passed to the last [`update`](Self::update).
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of updates so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, index: usize) -> Result<&Robot, KernelError> {
        let robots = self.robots.len();
        self.robots
            .get(index)
            .ok_or(KernelError::InvalidIndex { index, robots })
    }

    pub fn robot_mut(&mut self, index: usize) -> Result<&mut Robot, KernelError> {
        let robots = self.robots.len();
        self.robots
            .get_mut(index)
            .ok_or(KernelError::InvalidIndex { index, robots })
    }

    pub fn add_box(&mut self, config: &BoxConfig) {
        self.walls.push(Wall::from_box(config));
    }

    /// Add a robot and return its fleet index.
    pub fn add_robot(&mut self, robot: Robot) -> usize {
        self.robots.push(robot);
        self.robots.len() - 1
    }

    /// Hand a velocity command to the robot it addresses.
    pub fn apply_command(&mut self, command: &Command) -> Result<(), KernelError> {
        let robot = self.robot_mut(command.index)?;
        robot.apply_command(command);
        debug!(
            robot = %robot.name,
            vx = command.vx,
            vy = command.vy,
            va = command.va,
            "command applied"
        );
        Ok(())
    }

    /// Advance every robot one step, then refresh its sensors.
    pub fn update(&mut self, time: f64) {
        self.time = time;
        self.tick += 1;
        for index in 0..self.robots.len() {
            self.step_robot(index, time);
            self.sense(index);
        }
    }

    fn step_robot(&mut self, index: usize, time: f64) {
        let Some(robot) = self.robots.get(index) else {
            return;
        };
        let (position, direction) = robot.proposed_pose();
        let stalled = self.blocked(index, &bounding_corners(position, direction));
        let robot = &mut self.robots[index];
        robot.time = time;
        robot.record_trace();
        if stalled && !robot.stalled {
            debug!(robot = %robot.name, x = position.x, y = position.y, "robot stalled");
        }
        robot.stalled = stalled;
        if !stalled {
            robot.set_pose(position, direction);
        }
    }

    fn sense(&mut self, index: usize) {
        let Some(robot) = self.robots.get(index) else {
            return;
        };
        let distances: Vec<f64> = robot
            .range_sensors
            .iter()
            .map(|sensor| sensor.measure(self, index))
            .collect();
        let scans: Vec<_> = robot
            .cameras
            .iter()
            .map(|camera| camera.scan(self, index))
            .collect();
        let robot = &mut self.robots[index];
        for (sensor, distance) in robot.range_sensors.iter_mut().zip(distances) {
            sensor.set_distance(distance);
        }
        for (camera, scan) in robot.cameras.iter_mut().zip(scans) {
            camera.apply(scan);
        }
    }

    /// True if the square with these corners crosses any wall or another robot.
    fn blocked(&self, index: usize, corners: &[DVec2; 4]) -> bool {
        let edges = outline(corners);
        self.segments(RayFilter::AllExcept(index)).any(|(line, _)| {
            edges
                .iter()
                .any(|edge| segments_intersect(edge.p1, edge.p2, line.p1, line.p2))
        })
    }

    /// Wall and robot segments visible under `filter`, with their colors.
    fn segments(&self, filter: RayFilter) -> impl Iterator<Item = (Line, Color)> + '_ {
        let walls = self
            .walls
            .iter()
            .flat_map(|wall| wall.lines.iter().map(move |line| (*line, wall.color)));
        let robots = self
            .robots
            .iter()
            .enumerate()
            .filter(move |(i, _)| matches!(filter, RayFilter::AllExcept(me) if *i != me))
            .flat_map(|(_, robot)| robot.bounds.iter().map(move |line| (*line, robot.color)));
        walls.chain(robots)
    }

    /// Nearest hit along a ray of length `max_range` starting at `origin`
    /// with world heading `heading` (radians).
    pub fn cast_ray(
        &self,
        origin: DVec2,
        heading: f64,
        max_range: f64,
        filter: RayFilter,
    ) -> Option<Hit> {
        let end = rotate_around(origin, max_range, heading);
        self.segments(filter)
            .filter_map(|(line, color)| {
                intersect_hit(origin, end, line.p1, line.p2).map(|p| Hit::new(p, origin, color))
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Every hit on robots other than `viewer` along a ray.
    pub fn cast_ray_robots(
        &self,
        viewer: usize,
        origin: DVec2,
        heading: f64,
        max_range: f64,
    ) -> Vec<Hit> {
        let end = rotate_around(origin, max_range, heading);
        self.robots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != viewer)
            .flat_map(|(_, robot)| {
                robot.bounds.iter().filter_map(move |line| {
                    intersect_hit(origin, end, line.p1, line.p2)
                        .map(|p| Hit::new(p, origin, robot.color))
                })
            })
            .collect()
    }

    /// Image from camera `camera` of robot `robot`, as of the last update.
    pub fn take_picture(&self, robot: usize, camera: usize) -> Result<Picture, KernelError> {
        let cam = self
            .robot(robot)?
            .cameras
            .get(camera)
            .ok_or(KernelError::NoSuchCamera { robot, camera })?;
        Ok(cam.take_picture(self.size()))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use jyrobot_common::Point;
    use jyrobot_config::{CameraConfig, CameraSettings, RangeSensorConfig, RobotConfig};

    use super::*;

    fn solo(x: f64, y: f64, degrees: f64) -> RobotConfig {
        RobotConfig {
            name: format!("r{x}"),
            x,
            y,
            direction: degrees,
            ..RobotConfig::default()
        }
    }

    fn world_with(robots: Vec<RobotConfig>) -> World {
        let mut config = SimConfig::default();
        config.robots = robots;
        World::from_config(&config)
    }

    #[test]
    fn empty_world_has_boundary() {
        let world = World::new(500.0, 250.0);
        assert_eq!(world.walls().len(), 4);
        assert!(world.walls().iter().all(|w| w.kind == WallKind::Boundary));
        assert_eq!(world.size(), 500.0);
    }

    #[test]
    fn default_fleet_world() {
        let world = World::from_config(&SimConfig::default_fleet());
        assert_eq!(world.walls().len(), 8);
        assert_eq!(world.robots().len(), 2);
        assert_eq!(world.robots()[0].name, "Red");
    }

    #[test]
    fn box_wall_spans_its_rectangle() {
        let wall = Wall::from_box(&BoxConfig::new(
            Color::BLACK,
            Point::new(100.0, 0.0),
            Point::new(110.0, 110.0),
        ));
        assert_eq!(wall.lines.len(), 4);
        assert_eq!(wall.lines[0].length(), 10.0);
        assert_eq!(wall.lines[1].length(), 110.0);
    }

    #[test]
    fn ray_hits_boundary() {
        let world = World::new(100.0, 100.0);
        let hit = world
            .cast_ray(DVec2::new(50.0, 50.0), 0.0, 1000.0, RayFilter::WallsOnly)
            .unwrap();
        assert_abs_diff_eq!(hit.distance, 50.0, epsilon = 1e-9);
        assert_eq!(hit.color, world.boundary_wall_color);
    }

    #[test]
    fn short_ray_misses() {
        let world = World::new(100.0, 100.0);
        let hit = world.cast_ray(DVec2::new(50.0, 50.0), 0.0, 10.0, RayFilter::WallsOnly);
        assert!(hit.is_none());
    }

    #[test]
    fn ray_returns_nearest_wall() {
        let mut world = World::new(500.0, 250.0);
        world.add_box(&BoxConfig::new(
            Color::rgb(255, 255, 0),
            Point::new(300.0, 0.0),
            Point::new(310.0, 95.0),
        ));
        let hit = world
            .cast_ray(DVec2::new(250.0, 50.0), 0.0, 1000.0, RayFilter::WallsOnly)
            .unwrap();
        assert_abs_diff_eq!(hit.distance, 50.0, epsilon = 1e-9);
        assert_eq!(hit.color, Color::rgb(255, 255, 0));
    }

    #[test]
    fn robots_see_each_other_but_not_themselves() {
        let world = world_with(vec![solo(100.0, 100.0, 0.0), solo(200.0, 100.0, 180.0)]);
        let origin = DVec2::new(100.0, 100.0);
        let hit = world
            .cast_ray(origin, 0.0, 1000.0, RayFilter::AllExcept(0))
            .unwrap();
        assert_eq!(hit.color, world.robots()[1].color);
        assert!(hit.distance > 90.0 && hit.distance < 100.0);

        let walls_only = world
            .cast_ray(origin, 0.0, 1000.0, RayFilter::WallsOnly)
            .unwrap();
        assert_abs_diff_eq!(walls_only.distance, 400.0, epsilon = 1e-9);

        let robot_hits = world.cast_ray_robots(0, origin, 0.0, 1000.0);
        assert_eq!(robot_hits.len(), 2);
        assert!(world.cast_ray_robots(1, DVec2::new(200.0, 100.0), PI, 10.0).is_empty());
    }

    #[test]
    fn update_moves_robot_forward() {
        let mut world = world_with(vec![solo(100.0, 100.0, 0.0)]);
        world.robot_mut(0).unwrap().forward(2.0);
        world.update(0.05);
        let robot = &world.robots()[0];
        assert_abs_diff_eq!(robot.position().x, 102.0, epsilon = 1e-9);
        assert_abs_diff_eq!(robot.position().y, 100.0, epsilon = 1e-9);
        assert!(!robot.is_stalled());
        assert_eq!(robot.trace().len(), 1);
        assert_eq!(world.tick(), 1);
        assert_eq!(world.time(), 0.05);
    }

    #[test]
    fn robot_stalls_against_box() {
        let mut config = SimConfig::default();
        config.world.boxes.push(BoxConfig::new(
            Color::BLACK,
            Point::new(120.0, 0.0),
            Point::new(130.0, 200.0),
        ));
        config.robots.push(solo(100.0, 100.0, 0.0));
        let mut world = World::from_config(&config);
        world.robot_mut(0).unwrap().forward(5.0);
        let mut last = world.robots()[0].position();
        for step in 0..10 {
            world.update(step as f64 * 0.05);
            let now = world.robots()[0].position();
            if world.robots()[0].is_stalled() {
                assert_eq!(now, last);
            }
            last = now;
        }
        let robot = &world.robots()[0];
        assert!(robot.is_stalled());
        // half diagonal of the collision square along the axis
        assert!(robot.position().x + 10.0 * (PI / 4.0).cos() < 120.0);
    }

    #[test]
    fn robots_block_each_other() {
        let mut world = world_with(vec![solo(100.0, 100.0, 0.0), solo(115.0, 103.0, 180.0)]);
        world.robot_mut(0).unwrap().forward(3.0);
        world.update(0.05);
        assert!(world.robots()[0].is_stalled());
        assert_eq!(world.robots()[0].position(), DVec2::new(100.0, 100.0));
    }

    #[test]
    fn turning_in_place() {
        let mut world = world_with(vec![solo(100.0, 100.0, 0.0)]);
        world.robot_mut(0).unwrap().turn(0.25);
        world.update(0.05);
        world.update(0.10);
        assert_abs_diff_eq!(world.robots()[0].direction(), -0.5);
    }

    #[test]
    fn range_sensor_reads_wall_distance() {
        let mut robot = solo(50.0, 50.0, 0.0);
        robot.range_sensors = vec![RangeSensorConfig {
            position: 0.0,
            direction: 0.0,
            max: 100.0,
            width: 0.0,
        }];
        let mut config = SimConfig::default();
        config.world.width = 100.0;
        config.world.height = 100.0;
        config.robots.push(robot);
        let mut world = World::from_config(&config);
        world.update(0.05);
        let sensor = &world.robots()[0].range_sensors()[0];
        assert_abs_diff_eq!(sensor.distance(), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sensor.reading(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn range_sensor_out_of_range_reads_one() {
        let mut robot = solo(250.0, 125.0, 0.0);
        robot.range_sensors = vec![RangeSensorConfig {
            max: 20.0,
            ..RangeSensorConfig::default()
        }];
        let mut world = world_with(vec![robot]);
        world.update(0.05);
        assert_eq!(world.robots()[0].range_sensors()[0].reading(), 1.0);
    }

    #[test]
    fn range_sensor_direction_turns_the_beam() {
        let mut robot = solo(50.0, 30.0, 0.0);
        robot.range_sensors = vec![RangeSensorConfig {
            position: 0.0,
            direction: 90.0,
            max: 100.0,
            width: 0.0,
        }];
        let mut config = SimConfig::default();
        config.world.width = 100.0;
        config.world.height = 100.0;
        config.robots.push(robot);
        let mut world = World::from_config(&config);
        world.update(0.05);
        let sensor = &world.robots()[0].range_sensors()[0];
        assert_abs_diff_eq!(sensor.distance(), 70.0, epsilon = 1e-9);
    }

    #[test]
    fn camera_sees_boundary_in_every_column() {
        let mut robot = solo(250.0, 125.0, 0.0);
        robot.cameras = vec![CameraConfig::Camera(CameraSettings {
            width: 16,
            height: 8,
            ..CameraSettings::default()
        })];
        let mut world = world_with(vec![robot]);
        world.update(0.05);
        let camera = &world.robots()[0].cameras()[0];
        assert!(camera.wall_hits().iter().all(Option::is_some));
        let pic = world.take_picture(0, 0).unwrap();
        assert_eq!((pic.width(), pic.height()), (16, 8));
    }

    #[test]
    fn facing_robots_see_each_other() {
        let mut world = World::from_config(&SimConfig::default_fleet());
        // put the two stock robots face to face in open space
        world.robot_mut(0).unwrap().set_pose(DVec2::new(60.0, 200.0), PI);
        world.robot_mut(1).unwrap().set_pose(DVec2::new(20.0, 200.0), 0.0);
        world.update(0.05);
        let red = &world.robots()[0].cameras()[0];
        assert!(red.robot_hits().iter().any(|hits| !hits.is_empty()));
        let blue_pic = world.take_picture(1, 1).unwrap();
        let centre = blue_pic.width() / 2;
        assert!(blue_pic.column(centre).any(|c| c.red > 0 && c.blue == 0 && c.green == 0));
    }

    #[test]
    fn bad_indices_are_reported() {
        let mut world = World::from_config(&SimConfig::default_fleet());
        assert_eq!(
            world.apply_command(&Command::new(2, 1.5, -0.5, 10.0)),
            Err(KernelError::InvalidIndex { index: 2, robots: 2 })
        );
        assert_eq!(
            world.take_picture(0, 3).unwrap_err(),
            KernelError::NoSuchCamera { robot: 0, camera: 3 }
        );
    }

    #[test]
    fn command_reaches_robot() {
        let mut world = World::from_config(&SimConfig::default_fleet());
        world.apply_command(&Command::new(1, 1.0, 0.0, 0.0)).unwrap();
        assert_eq!(world.robots()[1].velocity(), (1.0, 0.0, 0.0));
    }
}

use glam::DVec2;
use jyrobot_common::{Color, Picture};
use jyrobot_kernel::geometry::rotate_around;
use jyrobot_kernel::{Robot, WallKind, World};

use crate::canvas::Canvas;

const TRACE_COLOR: Color = Color::rgb(200, 200, 200);
const STALLED_COLOR: Color = Color::rgb(128, 128, 128);
const DETAIL_COLOR: Color = Color::rgb(0, 64, 0);
const BEAM_FILL: Color = Color::rgba(128, 0, 128, 64);

/// Which overlays a frame includes, and at what scale.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Pixels per world unit.
    pub scale: f64,
    pub traces: bool,
    pub sensors: bool,
    /// Draw collision squares of robots with `debug` set.
    pub bounds: bool,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            scale: 1.0,
            traces: true,
            sensors: true,
            bounds: true,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads world state and a view configuration, then produces
/// output. It never mutates the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given world state and view.
    fn render(&self, world: &World, view: &RenderView) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable string representation of the world state.
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &World, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== World State (tick={}, time={:.2}) ===\n",
            world.tick(),
            world.time()
        ));
        out.push_str(&format!("Size: {}x{}\n", world.width(), world.height()));
        out.push_str(&format!("Walls: {}\n", world.walls().len()));
        out.push_str(&format!("Robots: {}\n", world.robots().len()));
        out.push_str(&format!("Scale: {:.2}\n", view.scale));

        for robot in world.robots() {
            let p = robot.position();
            out.push_str(&format!(
                "  [{}] pos=({:.2}, {:.2}) dir={:.1}",
                robot.name,
                p.x,
                p.y,
                robot.direction().to_degrees()
            ));
            if robot.is_stalled() {
                out.push_str(" STALLED");
            }
            if view.sensors && !robot.range_sensors().is_empty() {
                let readings: Vec<String> = robot
                    .range_sensors()
                    .iter()
                    .map(|s| format!("{:.2}", s.reading()))
                    .collect();
                out.push_str(&format!(" sensors=[{}]", readings.join(", ")));
            }
            out.push('\n');
        }

        out
    }
}

/// Top-down software renderer producing an RGBA [`Picture`].
///
/// Draws the ground, obstacles, boundary walls, then each robot with its
/// trace, body and sensor beams.
#[derive(Debug, Default)]
pub struct CanvasRenderer;

impl CanvasRenderer {
    pub fn new() -> Self {
        Self
    }

    fn draw_robot(canvas: &mut Canvas, robot: &Robot, view: &RenderView) {
        if view.traces {
            canvas.polyline(robot.trace(), 1.0, TRACE_COLOR);
        }
        if view.bounds && robot.debug {
            for line in robot.bounding_lines() {
                canvas.line(line.p1, line.p2, 1.0, Color::WHITE);
            }
        }

        let body = robot.body_outline();
        if robot.is_stalled() {
            canvas.polygon(&body, STALLED_COLOR);
            canvas.polyline(body.iter().chain(body.first()).copied(), 1.0, Color::WHITE);
        } else {
            canvas.polygon(&body, robot.color);
        }

        // Wheels sit on either side of the body, in robot coordinates.
        let local = |p: DVec2| robot.position() + DVec2::from_angle(robot.direction()).rotate(p);
        let local_rect = |origin: DVec2, size: DVec2| {
            [
                local(origin),
                local(origin + DVec2::new(size.x, 0.0)),
                local(origin + size),
                local(origin + DVec2::new(0.0, size.y)),
            ]
        };
        let wheel = DVec2::new(6.33, 1.67);
        canvas.polygon(&local_rect(DVec2::new(-3.33, -7.67), wheel), Color::BLACK);
        canvas.polygon(&local_rect(DVec2::new(-3.33, 6.0), wheel), Color::BLACK);
        canvas.ellipse(robot.position(), 1.67, DETAIL_COLOR);
        if !robot.cameras().is_empty() {
            canvas.polygon(
                &local_rect(DVec2::new(5.0, -3.33), DVec2::new(1.33, 6.33)),
                DETAIL_COLOR,
            );
        }

        if view.sensors {
            for sensor in robot.range_sensors() {
                let heading = robot.direction() + sensor.direction;
                let origin = rotate_around(robot.position(), sensor.position, heading);
                let stroke = if sensor.reading() < 1.0 {
                    Color::WHITE
                } else {
                    Color::BLACK
                };
                if sensor.width > 0.0 {
                    let (start, end) = (heading - sensor.width / 2.0, heading + sensor.width / 2.0);
                    canvas.wedge(origin, sensor.distance(), start, end, BEAM_FILL);
                    canvas.line(origin, rotate_around(origin, sensor.distance(), start), 1.0, stroke);
                    canvas.line(origin, rotate_around(origin, sensor.distance(), end), 1.0, stroke);
                } else {
                    canvas.line(origin, rotate_around(origin, sensor.distance(), heading), 1.0, stroke);
                }
            }
        }
    }
}

impl Renderer for CanvasRenderer {
    type Output = Picture;

    fn render(&self, world: &World, view: &RenderView) -> Picture {
        let mut canvas = Canvas::new(world.width(), world.height(), view.scale);
        canvas.fill(world.ground_color);

        for wall in world.walls() {
            match wall.kind {
                WallKind::Obstacle => {
                    let points: Vec<DVec2> = wall.lines.iter().map(|l| l.p1).collect();
                    canvas.polygon(&points, wall.color);
                }
                WallKind::Boundary => {
                    for line in &wall.lines {
                        canvas.line(line.p1, line.p2, 3.0, wall.color);
                    }
                }
            }
        }

        for robot in world.robots() {
            Self::draw_robot(&mut canvas, robot, view);
        }

        canvas.into_picture()
    }
}

#[cfg(test)]
mod tests {
    use jyrobot_config::{RobotConfig, SimConfig};

    use super::*;

    fn fleet_world() -> World {
        World::from_config(&SimConfig::default_fleet())
    }

    #[test]
    fn debug_renderer_empty_world() {
        let world = World::new(100.0, 50.0);
        let output = DebugTextRenderer::new().render(&world, &RenderView::default());

        assert!(output.contains("tick=0"));
        assert!(output.contains("Robots: 0"));
        assert!(output.contains("Walls: 4"));
    }

    #[test]
    fn debug_renderer_lists_robots() {
        let world = fleet_world();
        let output = DebugTextRenderer::new().render(&world, &RenderView::default());

        assert!(output.contains("Robots: 2"));
        assert!(output.contains("[Red] pos=(430.00, 50.00)"));
        assert!(output.contains("sensors=["));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.scale, 1.0);
        assert!(view.traces && view.sensors && view.bounds);
    }

    #[test]
    fn canvas_frame_matches_world_size() {
        let world = fleet_world();
        let picture = CanvasRenderer::new().render(&world, &RenderView::default());
        assert_eq!(picture.width(), 500);
        assert_eq!(picture.height(), 250);

        let half = RenderView {
            scale: 0.5,
            ..RenderView::default()
        };
        let small = CanvasRenderer::new().render(&world, &half);
        assert_eq!(small.width(), 250);
    }

    #[test]
    fn canvas_draws_ground_boxes_and_robots() {
        let world = fleet_world();
        let picture = CanvasRenderer::new().render(&world, &RenderView::default());

        assert_eq!(picture.get(50, 200), Some(world.ground_color));
        // Inside the black box at (100,0)-(110,110).
        assert_eq!(picture.get(105, 60), Some(Color::BLACK));
        // Boundary wall along the top edge.
        assert_eq!(picture.get(250, 0), Some(world.boundary_wall_color));
        let red = world.robots()[0].color;
        assert_eq!(picture.get(430, 46), Some(red));
    }

    #[test]
    fn stalled_robot_is_grey() {
        let mut world = World::new(100.0, 100.0);
        world.add_robot(Robot::from_config(&RobotConfig {
            x: 88.0,
            y: 50.0,
            body: vec![
                DVec2::new(-5.0, -5.0),
                DVec2::new(5.0, -5.0),
                DVec2::new(5.0, 5.0),
                DVec2::new(-5.0, 5.0),
            ],
            ..RobotConfig::default()
        }));
        let view = RenderView {
            sensors: false,
            ..RenderView::default()
        };
        let moving = CanvasRenderer::new().render(&world, &view);
        assert_eq!(moving.get(86, 52), Some(world.robots()[0].color));

        world.robot_mut(0).unwrap().forward(5.0);
        world.update(0.05);
        assert!(world.robots()[0].is_stalled());
        let stalled = CanvasRenderer::new().render(&world, &view);
        assert_eq!(stalled.get(86, 52), Some(STALLED_COLOR));
    }

    #[test]
    fn debug_robot_shows_bounds() {
        let json = r#"{"world": {"width": 100, "height": 100},
            "robots": [{"name": "A", "x": 50, "y": 50, "debug": true},
                       {"name": "B", "x": 50, "y": 20}]}"#;
        let world = World::from_config(&SimConfig::from_json(json).unwrap());
        assert!(world.robots()[0].debug);
        let view = RenderView {
            traces: false,
            ..RenderView::default()
        };
        let frame = CanvasRenderer::new().render(&world, &view);
        assert_eq!(frame.get(57, 50), Some(Color::WHITE));
        assert_ne!(frame.get(57, 20), Some(Color::WHITE));

        let hidden = RenderView {
            bounds: false,
            ..view
        };
        let frame = CanvasRenderer::new().render(&world, &hidden);
        assert_ne!(frame.get(57, 50), Some(Color::WHITE));
    }
}

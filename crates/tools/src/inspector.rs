use glam::DVec2;
use jyrobot_kernel::World;

/// World inspector for developer tooling.
///
/// Provides read-only queries against the world state for debugging
/// and CLI output.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            tick: world.tick(),
            time: world.time(),
            width: world.width(),
            height: world.height(),
            walls: world.walls().len(),
            robots: world.robots().len(),
            stalled: world.robots().iter().filter(|r| r.is_stalled()).count(),
        }
    }

    /// Pose and sensor state of one robot.
    pub fn inspect_robot(world: &World, index: usize) -> Option<RobotInfo> {
        world.robot(index).ok().map(|robot| RobotInfo {
            index,
            name: robot.name.clone(),
            position: robot.position(),
            direction_degrees: robot.direction().to_degrees(),
            velocity: robot.velocity(),
            stalled: robot.is_stalled(),
            readings: robot.range_sensors().iter().map(|s| s.reading()).collect(),
            cameras: robot.cameras().len(),
        })
    }

    /// Names of all robots, in fleet order.
    pub fn list_robots(world: &World) -> Vec<String> {
        world.robots().iter().map(|r| r.name.clone()).collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub time: f64,
    pub width: f64,
    pub height: f64,
    pub walls: usize,
    pub robots: usize,
    pub stalled: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} time={:.2} size={}x{} walls={} robots={} stalled={}",
            self.tick, self.time, self.width, self.height, self.walls, self.robots, self.stalled
        )
    }
}

/// Detailed info about a single robot.
#[derive(Debug, Clone)]
pub struct RobotInfo {
    pub index: usize,
    pub name: String,
    pub position: DVec2,
    pub direction_degrees: f64,
    pub velocity: (f64, f64, f64),
    pub stalled: bool,
    pub readings: Vec<f64>,
    pub cameras: usize,
}

impl std::fmt::Display for RobotInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Robot {} [{}] pos=({:.2}, {:.2}) dir={:.1} vel=({:.2}, {:.2}, {:.2}) cameras={}",
            self.index,
            self.name,
            self.position.x,
            self.position.y,
            self.direction_degrees,
            self.velocity.0,
            self.velocity.1,
            self.velocity.2,
            self.cameras,
        )?;
        if !self.readings.is_empty() {
            let readings: Vec<String> = self.readings.iter().map(|r| format!("{r:.2}")).collect();
            write!(f, " readings=[{}]", readings.join(", "))?;
        }
        if self.stalled {
            write!(f, " STALLED")?;
        }
        Ok(())
    }
}

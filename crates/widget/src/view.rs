use jyrobot_common::Picture;
use jyrobot_config::{Command, ConfigError, SimConfig};
use jyrobot_kernel::{KernelError, World};
use jyrobot_render::{CanvasRenderer, RenderView, Renderer};
use tracing::{debug, info, warn};

use crate::widget::{FieldChange, RobotWidget};

/// Simulated seconds added per `update`.
pub const TIME_STEP: f64 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("robot index {index} out of range (fleet has {robots} robots)")]
    InvalidIndex { index: usize, robots: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Kernel(KernelError),
    #[error("no world has been configured")]
    NoWorld,
}

impl From<KernelError> for ViewError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::InvalidIndex { index, robots } => Self::InvalidIndex { index, robots },
            other => Self::Kernel(other),
        }
    }
}

/// Observer half of the widget: owns the simulated world and its frame.
#[derive(Debug)]
pub struct SimulatorView {
    world: Option<World>,
    frame: Option<Picture>,
    time: f64,
    /// Last `update_int` stepped to.
    update_int: u64,
    render_view: RenderView,
    renderer: CanvasRenderer,
}

impl Default for SimulatorView {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorView {
    pub fn new() -> Self {
        Self::with_render_view(RenderView::default())
    }

    pub fn with_render_view(render_view: RenderView) -> Self {
        Self {
            world: None,
            frame: None,
            time: 0.0,
            update_int: 0,
            render_view,
            renderer: CanvasRenderer::new(),
        }
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Most recent top-down frame.
    pub fn frame(&self) -> Option<&Picture> {
        self.frame.as_ref()
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Drain the widget's change log and apply every change in order.
    ///
    /// A failing change does not stop later ones; the first error is
    /// returned once the log is exhausted. Returns the number of changes seen,
    /// after the widget coalesced them.
    pub fn sync(&mut self, widget: &mut RobotWidget) -> Result<usize, ViewError> {
        let changes = widget.drain_changes();
        let mut first_error = None;
        for change in &changes {
            if let Err(err) = self.apply(change) {
                warn!(error = %err, "change rejected");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(changes.len()),
        }
    }

    /// Apply one field change. An update steps once per count since the
    /// last `update_int` seen.
    pub fn apply(&mut self, change: &FieldChange) -> Result<(), ViewError> {
        match change {
            FieldChange::ConfigChanged { config } => self.rebuild(config),
            FieldChange::Updated { update_int } => self.advance_to(*update_int),
            FieldChange::Drawn { .. } => self.redraw(),
            FieldChange::CommandChanged { command } => self.command(command),
        }
    }

    fn rebuild(&mut self, config: &str) -> Result<(), ViewError> {
        let config = SimConfig::from_json(config)?;
        let world = World::from_config(&config);
        self.time = 0.0;
        self.frame = Some(self.renderer.render(&world, &self.render_view));
        self.world = Some(world);
        info!(robots = config.robots.len(), "view rebuilt");
        Ok(())
    }

    fn advance_to(&mut self, update_int: u64) -> Result<(), ViewError> {
        let world = self.world.as_mut().ok_or(ViewError::NoWorld)?;
        let steps = update_int.saturating_sub(self.update_int);
        self.update_int = update_int;
        for _ in 0..steps {
            self.time += TIME_STEP;
            world.update(self.time);
        }
        for robot in world.robots() {
            let p = robot.position();
            debug!(
                robot = %robot.name,
                x = p.x,
                y = p.y,
                direction = robot.direction().to_degrees(),
                "robot pose"
            );
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<(), ViewError> {
        let world = self.world.as_ref().ok_or(ViewError::NoWorld)?;
        self.frame = Some(self.renderer.render(world, &self.render_view));
        Ok(())
    }

    fn command(&mut self, command: &str) -> Result<(), ViewError> {
        if command.is_empty() {
            return Ok(());
        }
        let command = Command::from_json(command)?;
        let world = self.world.as_mut().ok_or(ViewError::NoWorld)?;
        world.apply_command(&command)?;
        Ok(())
    }
}

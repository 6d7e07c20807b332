use jyrobot_config::{Command, ConfigError, SimConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A write to one synchronized field.
///
/// Each variant carries the field's new value, so an observer can apply the
/// log without reading the widget back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldChange {
    /// `config` was replaced with this JSON.
    ConfigChanged { config: String },
    /// `update_int` reached this value.
    Updated { update_int: u64 },
    /// `draw_int` reached this value.
    Drawn { draw_int: u64 },
    /// `command` was replaced with this JSON.
    CommandChanged { command: String },
}

/// The synchronized fields, exactly as the view sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetState {
    pub config: String,
    pub update_int: u64,
    pub draw_int: u64,
    pub command: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("malformed config: {0}")]
    MalformedConfig(#[source] ConfigError),
    #[error("could not encode field: {0}")]
    Encode(#[source] ConfigError),
}

/// Controller half of the widget.
///
/// Holds the synced fields and a coalescing change log: a new config drops
/// pending draws and commands, only the latest draw and command stay
/// pending, and back-to-back updates collapse into one entry carrying the
/// latest `update_int`. No field is interpreted here: index checks and simulation
/// belong to the view.
#[derive(Debug, Clone)]
pub struct RobotWidget {
    state: WidgetState,
    change_log: Vec<FieldChange>,
}

impl RobotWidget {
    /// Widget showing the given world and fleet.
    pub fn new(config: &SimConfig) -> Result<Self, WidgetError> {
        let json = config.to_json().map_err(WidgetError::Encode)?;
        Ok(Self::with_config_json(json))
    }

    /// Widget from a config JSON string. The string is kept verbatim once it
    /// parses and validates.
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        SimConfig::from_json(json).map_err(WidgetError::MalformedConfig)?;
        Ok(Self::with_config_json(json.to_owned()))
    }

    fn with_config_json(config: String) -> Self {
        let mut widget = Self {
            state: WidgetState {
                config: String::new(),
                update_int: 0,
                draw_int: 0,
                command: String::new(),
            },
            change_log: Vec::new(),
        };
        widget.write_config(config);
        widget
    }

    fn write_config(&mut self, config: String) {
        self.state.config.clone_from(&config);
        self.record(FieldChange::ConfigChanged { config });
    }

    fn record(&mut self, change: FieldChange) {
        let log = &mut self.change_log;
        match change {
            FieldChange::ConfigChanged { .. } => {
                log.retain(|pending| matches!(pending, FieldChange::Updated { .. }));
            }
            FieldChange::Drawn { .. } | FieldChange::CommandChanged { .. } => {
                let kind = std::mem::discriminant(&change);
                log.retain(|pending| std::mem::discriminant(pending) != kind);
            }
            FieldChange::Updated { .. } => {}
        }
        log.push(change);
        log.dedup_by(|later, earlier| match (later, earlier) {
            (FieldChange::Updated { update_int: new }, FieldChange::Updated { update_int: old }) => {
                *old = *new;
                true
            }
            _ => false,
        });
    }

    /// Replace the world and fleet.
    pub fn set_config(&mut self, config: &SimConfig) -> Result<(), WidgetError> {
        let json = config.to_json().map_err(WidgetError::Encode)?;
        self.write_config(json);
        Ok(())
    }

    /// Ask the view to advance the simulation one step.
    pub fn update(&mut self) {
        self.state.update_int += 1;
        self.record(FieldChange::Updated {
            update_int: self.state.update_int,
        });
    }

    /// Ask the view to redraw.
    pub fn draw(&mut self) {
        self.state.draw_int += 1;
        self.record(FieldChange::Drawn {
            draw_int: self.state.draw_int,
        });
    }

    /// Send velocities to robot `index`, replacing any previous command.
    pub fn set_robot(&mut self, index: usize, vx: f64, vy: f64, va: f64) -> Result<(), WidgetError> {
        let command = Command::new(index, vx, vy, va)
            .to_json()
            .map_err(WidgetError::Encode)?;
        debug!(%command, "command set");
        self.state.command.clone_from(&command);
        self.record(FieldChange::CommandChanged { command });
        Ok(())
    }

    pub fn config(&self) -> &str {
        &self.state.config
    }

    pub fn update_int(&self) -> u64 {
        self.state.update_int
    }

    pub fn draw_int(&self) -> u64 {
        self.state.draw_int
    }

    /// Last command JSON, empty until the first [`set_robot`](Self::set_robot).
    pub fn command(&self) -> &str {
        &self.state.command
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Changes not yet drained, coalesced.
    pub fn changes(&self) -> &[FieldChange] {
        &self.change_log
    }

    /// Drain and return the change log.
    pub fn drain_changes(&mut self) -> Vec<FieldChange> {
        std::mem::take(&mut self.change_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> RobotWidget {
        RobotWidget::new(&SimConfig::default_fleet()).unwrap()
    }

    #[test]
    fn new_stores_config_json() {
        let w = widget();
        let config = SimConfig::from_json(w.config()).unwrap();
        assert_eq!(config, SimConfig::default_fleet());
        assert_eq!(w.update_int(), 0);
        assert_eq!(w.draw_int(), 0);
    }

    #[test]
    fn command_starts_empty() {
        assert_eq!(widget().command(), "");
    }

    #[test]
    fn update_n_times_adds_n() {
        let mut w = widget();
        for _ in 0..7 {
            w.update();
        }
        assert_eq!(w.update_int(), 7);
        assert_eq!(w.draw_int(), 0);
        assert_eq!(w.command(), "");
    }

    #[test]
    fn draw_leaves_update_alone() {
        let mut w = widget();
        w.update();
        w.draw();
        w.draw();
        assert_eq!(w.draw_int(), 2);
        assert_eq!(w.update_int(), 1);
    }

    #[test]
    fn set_robot_writes_command_json() {
        let mut w = widget();
        w.set_robot(2, 1.5, -0.5, 10.0).unwrap();
        assert_eq!(w.command(), r#"{"index":2,"vx":1.5,"vy":-0.5,"va":10.0}"#);
        assert_eq!(w.update_int(), 0);
        assert_eq!(w.draw_int(), 0);
    }

    #[test]
    fn second_command_overwrites_first() {
        let mut w = widget();
        w.set_robot(0, 1.0, 0.0, 0.0).unwrap();
        w.set_robot(1, 0.0, 0.0, 0.5).unwrap();
        let command = Command::from_json(w.command()).unwrap();
        assert_eq!(command, Command::new(1, 0.0, 0.0, 0.5));
    }

    #[test]
    fn from_json_keeps_text_verbatim() {
        let json = r#"{"world": {"width": 300}}"#;
        let w = RobotWidget::from_json(json).unwrap();
        assert_eq!(w.config(), json);
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = RobotWidget::from_json("{not json").unwrap_err();
        assert!(matches!(err, WidgetError::MalformedConfig(ConfigError::Json(_))));

        let err = RobotWidget::from_json(r#"{"world": {"width": 0}}"#).unwrap_err();
        assert!(matches!(err, WidgetError::MalformedConfig(ConfigError::Malformed(_))));
    }

    #[test]
    fn change_log_records_call_order() {
        let mut w = widget();
        w.update();
        w.set_robot(0, 1.0, 0.0, 0.0).unwrap();
        w.draw();
        w.update();

        let changes = w.drain_changes();
        assert_eq!(changes.len(), 5);
        assert!(matches!(changes[0], FieldChange::ConfigChanged { .. }));
        assert_eq!(changes[1], FieldChange::Updated { update_int: 1 });
        assert!(matches!(changes[2], FieldChange::CommandChanged { .. }));
        assert_eq!(changes[3], FieldChange::Drawn { draw_int: 1 });
        assert_eq!(changes[4], FieldChange::Updated { update_int: 2 });
        assert!(w.changes().is_empty());
    }

    #[test]
    fn repeated_updates_collapse() {
        let mut w = widget();
        for _ in 0..100_000 {
            w.update();
        }
        assert_eq!(w.changes().len(), 2);
        assert_eq!(w.changes()[1], FieldChange::Updated { update_int: 100_000 });
    }

    #[test]
    fn second_command_replaces_pending_one() {
        let mut w = widget();
        w.drain_changes();
        w.set_robot(0, 1.0, 0.0, 0.0).unwrap();
        w.set_robot(1, 0.0, 0.0, 0.5).unwrap();
        assert_eq!(
            w.changes(),
            [FieldChange::CommandChanged {
                command: w.command().to_owned()
            }]
        );
    }

    #[test]
    fn interleaved_update_and_draw_stay_bounded() {
        let mut w = widget();
        for _ in 0..1000 {
            w.update();
            w.set_robot(0, 1.0, 0.0, 0.0).unwrap();
            w.draw();
        }
        let changes = w.drain_changes();
        assert!(changes.len() <= 4, "{changes:?}");
        assert!(changes.contains(&FieldChange::Updated { update_int: 1000 }));
        assert!(changes.contains(&FieldChange::Drawn { draw_int: 1000 }));
    }

    #[test]
    fn new_config_drops_pending_command_and_draw() {
        let mut w = widget();
        w.update();
        w.set_robot(0, 1.0, 0.0, 0.0).unwrap();
        w.draw();
        w.update();
        w.set_config(&SimConfig::default_fleet()).unwrap();
        let changes = w.drain_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], FieldChange::Updated { update_int: 2 });
        assert!(matches!(changes[1], FieldChange::ConfigChanged { .. }));
    }

    #[test]
    fn set_config_replaces_config() {
        let mut w = widget();
        w.drain_changes();
        let mut config = SimConfig::default_fleet();
        config.robots.truncate(1);
        w.set_config(&config).unwrap();
        assert_eq!(SimConfig::from_json(w.config()).unwrap().robots.len(), 1);
        assert_eq!(w.changes().len(), 1);
    }

    #[test]
    fn state_serializes_synced_fields() {
        let mut w = RobotWidget::from_json("{}").unwrap();
        w.update();
        let json = serde_json::to_string(w.state()).unwrap();
        assert_eq!(
            json,
            r#"{"config":"{}","update_int":1,"draw_int":0,"command":""}"#
        );
    }
}

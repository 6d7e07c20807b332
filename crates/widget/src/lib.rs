//! Widget Controller: synced fields driving a simulator view.
//!
//! The controller owns four synchronized fields (`config`, `update_int`,
//! `draw_int`, `command`). Every write is recorded in a change log that a
//! [`SimulatorView`] drains and applies in order.
//!
//! # Invariants
//! - `update()` and `draw()` each bump exactly one counter by exactly one.
//! - `command` holds the last velocity command; last write wins.
//! - The change log stays bounded: consecutive updates merge, and at most one
//!   draw and one command are pending. The view steps by the `update_int` delta.

mod view;
mod widget;

pub use view::{SimulatorView, ViewError, TIME_STEP};
pub use widget::{FieldChange, RobotWidget, WidgetError, WidgetState};

/// Front-end module that renders the widget.
pub const MODULE_NAME: &str = "jyrobot";
/// Front-end module version.
pub const MODULE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Model class registered by the front-end module.
pub const MODEL_NAME: &str = "ExampleModel";
/// View class registered by the front-end module.
pub const VIEW_NAME: &str = "ExampleView";

pub fn crate_info() -> &'static str {
    "jyrobot-widget v0.1.0"
}

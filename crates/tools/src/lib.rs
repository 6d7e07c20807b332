//! Developer Tooling: read-only inspection of a running simulation.
//!
//! # Invariants
//! - Tools never mutate the world.

mod inspector;

pub use inspector::{RobotInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "jyrobot-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}

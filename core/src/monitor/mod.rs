//! Teammate health monitor with auto-select.
//!
//! The same pick-one-winner pattern as the skill scheduler, pointed at
//! teammates instead of skills: estimate each teammate's health from
//! their on-screen bar, and select the most at-risk one, subject to the
//! monitor's own cooldown. Selection yields to the player whenever the
//! physical right mouse button is held.

mod select;

pub use select::{
    HealthMonitor, MonitorOutcome, MonitorSettings, TeammateDefinition, estimate_health,
};

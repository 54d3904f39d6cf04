pub mod clock;
pub mod conditions;
pub mod config;
pub mod events;
pub mod hotkeys;
pub mod input;
pub mod monitor;
pub mod scheduler;
pub mod screen;
pub mod service;
pub mod skills;

#[cfg(test)]
mod testutil;

// Re-exports for convenience
pub use conditions::{ConditionDefinition, ConditionEngine, ConditionKind, EvalError};
pub use events::SchedulerEvent;
pub use monitor::{HealthMonitor, MonitorSettings, TeammateDefinition};
pub use scheduler::{SkillScheduler, TickOutcome};
pub use service::{ServiceHandle, StartStatus, StopStatus};
pub use skills::{SkillDefinition, SkillEntry};

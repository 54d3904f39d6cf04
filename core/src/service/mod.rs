//! Control plane: the supervisor thread and its handle.
//!
//! One long-lived OS thread owns the scheduler, the health monitor, and
//! the `Idle -> Running -> Idle` state machine. Everything else —
//! UI commands, global hotkey callbacks — talks to it by posting
//! [`ServiceCommand`]s on a single-consumer channel. The thread drains
//! the channel once per tick while running and blocks on it while idle,
//! so there is no lock around the running flag and no busy wait.
//!
//! ```text
//!   hotkey callback ──┐
//!   UI / embedder ────┼──▶ mpsc ──▶ supervisor thread
//!                     │             ├─ drain commands (per tick)
//!   ServiceHandle ────┘             ├─ SkillScheduler::run_tick
//!                                   ├─ HealthMonitor::run_tick
//!                                   └─ sleep(tick - elapsed)
//! ```
//!
//! `start`/`stop` are idempotent and acknowledged: the reply to a Stop
//! is sent from between ticks, so once `stop()` returns no further
//! injector calls can happen. An in-flight press/release sequence
//! completes first; cancellation is cooperative.

mod handler;
mod supervisor;


pub use handler::{ServiceError, ServiceHandle, StartStatus, StopStatus};
pub use supervisor::spawn;

use std::sync::mpsc;

use crate::conditions::ConditionDefinition;
use crate::monitor::{MonitorSettings, TeammateDefinition};
use crate::skills::SkillDefinition;

/// Commands accepted by the supervisor thread.
pub(crate) enum ServiceCommand {
    /// Enter the Running state. `reply` is absent for hotkey callbacks.
    Start { reply: Option<mpsc::Sender<StartStatus>> },

    /// Leave the Running state.
    Stop { reply: Option<mpsc::Sender<StopStatus>> },

    /// Replace skills and conditions wholesale.
    SwapPool {
        skills: Vec<SkillDefinition>,
        conditions: Vec<ConditionDefinition>,
    },

    /// Replace the teammate pool wholesale.
    SwapTeammates { teammates: Vec<TeammateDefinition> },

    /// Replace the monitor settings.
    SetMonitorSettings { settings: MonitorSettings },

    /// Exit the supervisor thread.
    Shutdown { reply: mpsc::Sender<()> },
}

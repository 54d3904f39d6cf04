//! Signals emitted by the scheduler for cross-cutting concerns.
//!
//! These represent "interesting things that happened" at a higher level
//! than individual eligibility probes; frontends drain them for action
//! logs, toasts, or TTS.

use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// The scheduler loop started running.
    Started { timestamp: NaiveDateTime },

    /// The scheduler loop stopped.
    Stopped { timestamp: NaiveDateTime },

    /// A skill fired (press/release completed successfully).
    SkillUsed {
        skill_id: String,
        skill_name: String,
        key: String,
        timestamp: NaiveDateTime,
    },

    /// The health monitor selected a teammate.
    TeammateSelected {
        teammate_id: String,
        teammate_name: String,
        health_pct: f32,
        timestamp: NaiveDateTime,
    },

    /// An input injection failed; the tick was abandoned.
    InjectionFailed {
        /// Skill or teammate id, depending on which loop was injecting.
        source_id: String,
        reason: String,
        timestamp: NaiveDateTime,
    },
}

pub(crate) fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

//! The priority/cooldown-gated skill scheduler.
//!
//! One tick: probe every pool entry for eligibility, pick the single
//! best candidate by `(priority, pool order)`, inject its key, record
//! the firing time. The loop around ticks (thread, sleeping, commands)
//! lives in [`crate::service`]; this module is synchronous and fully
//! testable without threads.
//!
//! Per-entry faults (bad regions, unresolved conditions, capture
//! failures) are isolated: the offending entry reads as ineligible and
//! the tick continues with the rest of the pool. Each distinct fault is
//! logged once until the pool is next swapped, to keep a misconfigured
//! entry from flooding the log at poll rate.

mod tick;


pub use tick::{SkillScheduler, TickOutcome};

//! Skill definitions and per-skill runtime state.
//!
//! A skill is a key to inject, gated by four checks that must all pass
//! before the scheduler may fire it: enabled flag, software cooldown,
//! optional icon template match (the visual "off cooldown" glow), and
//! the skill's trigger conditions. Eligibility probing is pure; only the
//! scheduler mutates `last_used`, and only after a successful injection.

mod definitions;
mod runtime;

pub use definitions::{IconProbe, SkillDefinition};
pub use runtime::{SkillEntry, SkillFault, SkillState};

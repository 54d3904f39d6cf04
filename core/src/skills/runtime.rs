//! Skill runtime state and eligibility.

use std::time::Instant;

use crate::clock::duration_from_secs;
use crate::conditions::{ConditionEngine, EvalError};
use crate::screen::{CaptureError, ScreenSampler};

use super::definitions::SkillDefinition;

/// Faults encountered while probing eligibility. The scheduler logs
/// these (rate-limited) and treats the skill as ineligible; they never
/// abort a tick.
#[derive(Debug, thiserror::Error)]
pub enum SkillFault {
    #[error(transparent)]
    Condition(#[from] EvalError),

    #[error("icon probe failed: {0}")]
    Icon(#[from] CaptureError),
}

/// Mutable per-skill state. Owned by the scheduler pool entry; only the
/// scheduler thread writes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillState {
    /// Time of the last successful fire, taken strictly after the
    /// press/release sequence completed. Monotonically non-decreasing.
    pub last_used: Option<Instant>,
}

/// A skill definition paired with its runtime state; one pool slot.
#[derive(Debug, Clone)]
pub struct SkillEntry {
    pub def: SkillDefinition,
    pub state: SkillState,
}

impl SkillEntry {
    pub fn new(def: SkillDefinition) -> Self {
        Self { def, state: SkillState::default() }
    }

    /// Whether the software cooldown has elapsed. Boundary inclusive:
    /// eligible at exactly `last_used + cooldown`.
    pub fn cooldown_ready(&self, now: Instant) -> bool {
        match self.state.last_used {
            None => true,
            Some(last) => {
                // A cooldown too large to add to an Instant never elapses.
                match last.checked_add(duration_from_secs(self.def.cooldown_secs)) {
                    Some(ready_at) => now >= ready_at,
                    None => false,
                }
            }
        }
    }

    /// Full eligibility probe. Pure: no state is mutated, intervals are
    /// not consumed.
    ///
    /// Check order mirrors cost: flag, cooldown, icon capture, then the
    /// condition tree.
    pub fn is_eligible(
        &self,
        now: Instant,
        sampler: &dyn ScreenSampler,
        engine: &ConditionEngine,
    ) -> Result<bool, SkillFault> {
        if !self.def.enabled {
            return Ok(false);
        }
        if !self.cooldown_ready(now) {
            return Ok(false);
        }

        // Visual gate: both the software cooldown and the on-screen icon
        // state must agree the skill is ready.
        if let Some(icon) = &self.def.icon {
            if let Some(template) = &icon.template {
                let lit = sampler.template_match(icon.region, template, icon.match_threshold)?;
                if !lit {
                    return Ok(false);
                }
            }
        }

        for condition_id in &self.def.trigger_conditions {
            if !engine.probe(condition_id, now, sampler)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Record a successful fire. `at` must come from the clock strictly
    /// after the injection primitives completed.
    pub fn mark_used(&mut self, at: Instant) {
        // Keep last_used monotone even if a backwards clock sneaks in.
        if self.state.last_used.is_none_or(|prev| at >= prev) {
            self.state.last_used = Some(at);
        }
    }
}

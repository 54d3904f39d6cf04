//! Tick execution and winner selection.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc;

use tracing::{debug, error, warn};

use crate::clock::{Clock, duration_from_secs};
use crate::conditions::{ConditionDefinition, ConditionEngine};
use crate::events::{SchedulerEvent, now_local};
use crate::input::InputInjector;
use crate::screen::ScreenSampler;
use crate::skills::{SkillDefinition, SkillEntry, SkillFault};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was eligible; the tick was a no-op.
    NoneEligible,
    /// The winner's key was injected and its timestamp recorded.
    Fired { skill_id: String },
    /// The winner was chosen but injection failed; no timestamp update.
    InjectionFailed { skill_id: String },
}

/// Owns the skill pool, the condition engine, and the injected
/// capabilities. All mutation happens on the thread that calls
/// [`run_tick`](Self::run_tick).
pub struct SkillScheduler {
    pool: Vec<SkillEntry>,
    engine: ConditionEngine,
    sampler: Arc<dyn ScreenSampler>,
    injector: Arc<dyn InputInjector>,
    clock: Arc<dyn Clock>,
    events: Option<mpsc::Sender<SchedulerEvent>>,
    /// Fault keys already logged since the last pool swap.
    reported_faults: HashSet<String>,
}

impl SkillScheduler {
    pub fn new(
        sampler: Arc<dyn ScreenSampler>,
        injector: Arc<dyn InputInjector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool: Vec::new(),
            engine: ConditionEngine::default(),
            sampler,
            injector,
            clock,
            events: None,
            reported_faults: HashSet::new(),
        }
    }

    /// Attach an event sink. Send failures (receiver gone) are ignored.
    pub fn set_events(&mut self, events: mpsc::Sender<SchedulerEvent>) {
        self.events = Some(events);
    }

    pub fn pool(&self) -> &[SkillEntry] {
        &self.pool
    }

    pub fn engine(&self) -> &ConditionEngine {
        &self.engine
    }

    /// Replace skills and conditions wholesale (structural edits from the
    /// config UI arrive as a swap, never as in-place mutation).
    ///
    /// `last_used` survives for skill ids present in both pools, and
    /// interval state survives inside the engine, so a config edit does
    /// not reset cooldowns and does not allow an immediate re-fire.
    pub fn swap_pool(
        &mut self,
        skills: Vec<SkillDefinition>,
        conditions: Vec<ConditionDefinition>,
    ) {
        let now = self.clock.now();

        let mut old_state: std::collections::HashMap<String, _> = self
            .pool
            .drain(..)
            .map(|entry| (entry.def.id.clone(), entry.state))
            .collect();

        let mut seen = HashSet::new();
        for def in skills {
            if !seen.insert(def.id.clone()) {
                warn!(id = %def.id, "duplicate skill id, keeping the first definition");
                continue;
            }
            let mut entry = SkillEntry::new(def);
            if let Some(state) = old_state.remove(&entry.def.id) {
                entry.state = state;
            }
            self.pool.push(entry);
        }

        self.engine.swap_definitions(conditions, now);
        // New config, new chance to report old faults once.
        self.reported_faults.clear();
    }

    /// Run one tick: select at most one winner and fire it.
    ///
    /// Sleeping between ticks is the caller's job; this only blocks for
    /// the winner's own press/release delays.
    pub fn run_tick(&mut self) -> TickOutcome {
        let now = self.clock.now();

        let mut winner: Option<usize> = None;
        let mut faults: Vec<(String, SkillFault)> = Vec::new();

        for (idx, entry) in self.pool.iter().enumerate() {
            match entry.is_eligible(now, &*self.sampler, &self.engine) {
                Ok(true) => {
                    // Strictly lower priority wins; pool order breaks ties,
                    // and earlier indexes are visited first.
                    let better = match winner {
                        None => true,
                        Some(best) => entry.def.priority < self.pool[best].def.priority,
                    };
                    if better {
                        winner = Some(idx);
                    }
                }
                Ok(false) => {}
                Err(fault) => faults.push((entry.def.id.clone(), fault)),
            }
        }

        for (skill_id, fault) in faults {
            self.report_fault(&skill_id, &fault);
        }

        match winner {
            Some(idx) => self.fire(idx),
            None => TickOutcome::NoneEligible,
        }
    }

    /// Inject the winner's key: press, hold, release, settle — serialized
    /// and blocking so injections never overlap.
    fn fire(&mut self, idx: usize) -> TickOutcome {
        let def = self.pool[idx].def.clone();

        if let Err(err) = self.injector.press(&def.key) {
            error!(skill = %def.id, key = %def.key, %err, "key press failed, abandoning tick");
            self.emit(SchedulerEvent::InjectionFailed {
                source_id: def.id.clone(),
                reason: err.to_string(),
                timestamp: now_local(),
            });
            return TickOutcome::InjectionFailed { skill_id: def.id };
        }
        self.clock.sleep(duration_from_secs(def.press_delay_secs));

        if let Err(err) = self.injector.release(&def.key) {
            // The key may be physically stuck down; that is the worst
            // failure this loop can produce, so log it loudly.
            error!(skill = %def.id, key = %def.key, %err, "key release failed after press");
            self.emit(SchedulerEvent::InjectionFailed {
                source_id: def.id.clone(),
                reason: err.to_string(),
                timestamp: now_local(),
            });
            return TickOutcome::InjectionFailed { skill_id: def.id };
        }
        self.clock.sleep(duration_from_secs(def.release_delay_secs));

        // Timestamp strictly after the injection completed, so cooldowns
        // measure from when the input actually landed.
        let after = self.clock.now();
        self.pool[idx].mark_used(after);
        for condition_id in &def.trigger_conditions {
            self.engine.consume(condition_id, after);
        }

        debug!(skill = %def.id, key = %def.key, "skill fired");
        self.emit(SchedulerEvent::SkillUsed {
            skill_id: def.id.clone(),
            skill_name: def.name.clone(),
            key: def.key.clone(),
            timestamp: now_local(),
        });

        TickOutcome::Fired { skill_id: def.id }
    }

    fn emit(&self, event: SchedulerEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// Log a per-entry fault once per (skill, offending id) until the
    /// next pool swap.
    fn report_fault(&mut self, skill_id: &str, fault: &SkillFault) {
        let key = match fault {
            SkillFault::Condition(err) => format!("{skill_id}/{}", err.offending_id()),
            SkillFault::Icon(_) => format!("{skill_id}/icon"),
        };
        if self.reported_faults.insert(key) {
            warn!(skill = %skill_id, %fault, "eligibility fault, treating skill as ineligible");
        }
    }
}

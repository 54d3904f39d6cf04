//! Condition resolution and evaluation.

use std::collections::HashMap;
use std::time::Instant;

use keyrota_types::ComboType;
use tracing::warn;

use crate::clock::duration_from_secs;
use crate::screen::{CaptureError, ScreenSampler};

use super::definitions::{ConditionDefinition, ConditionKind};

/// Maximum combo nesting depth. Anything deeper is either a cycle or a
/// configuration nobody intended; both are rejected the same way.
pub const MAX_COMBO_DEPTH: usize = 8;

/// Structural faults raised while evaluating a condition.
///
/// Routine "not eligible right now" outcomes are `Ok(false)`, never an
/// error. Gating callers translate any of these into ineligibility; they
/// must never abort a tick.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("unknown condition '{0}'")]
    UnknownCondition(String),

    #[error("combo '{parent}' references missing condition '{child}'")]
    UnresolvedChild { parent: String, child: String },

    #[error("cycle or nesting deeper than {MAX_COMBO_DEPTH} while evaluating '{0}'")]
    RecursionLimit(String),

    #[error("condition '{id}' has a zero-size region")]
    DegenerateRegion { id: String },

    #[error("condition '{id}': {source}")]
    Capture {
        id: String,
        #[source]
        source: CaptureError,
    },
}

impl EvalError {
    /// The id to key once-per-fault log suppression on.
    pub fn offending_id(&self) -> &str {
        match self {
            Self::UnknownCondition(id)
            | Self::RecursionLimit(id)
            | Self::DegenerateRegion { id }
            | Self::Capture { id, .. } => id,
            Self::UnresolvedChild { child, .. } => child,
        }
    }
}

/// Per-interval runtime bookkeeping, keyed by condition id.
#[derive(Debug, Clone, Copy)]
struct IntervalState {
    /// When the engine first saw the definition; anchors the initial delay.
    created_at: Instant,
    /// Last explicit consumption. `None` until the first consume.
    last_fire: Option<Instant>,
}

/// Resolves condition definitions by id and evaluates them.
///
/// Probing is read-only; interval consumption is a separate, explicit
/// mutation so callers can test-evaluate conditions freely.
#[derive(Debug, Default)]
pub struct ConditionEngine {
    definitions: HashMap<String, ConditionDefinition>,
    intervals: HashMap<String, IntervalState>,
}

impl ConditionEngine {
    pub fn new(definitions: Vec<ConditionDefinition>, now: Instant) -> Self {
        let mut engine = Self::default();
        engine.swap_definitions(definitions, now);
        engine
    }

    /// Replace the whole definition set (structural edits come in as a
    /// wholesale swap, never in place).
    ///
    /// Interval state survives for ids that still exist as intervals, so
    /// editing an unrelated condition does not reset everyone's timers.
    pub fn swap_definitions(&mut self, definitions: Vec<ConditionDefinition>, now: Instant) {
        let mut map = HashMap::with_capacity(definitions.len());
        for def in definitions {
            if map.contains_key(&def.id) {
                warn!(id = %def.id, "duplicate condition id, keeping the first definition");
                continue;
            }
            map.insert(def.id.clone(), def);
        }

        self.intervals.retain(|id, _| {
            map.get(id).is_some_and(ConditionDefinition::is_interval)
        });
        for def in map.values().filter(|d| d.is_interval()) {
            self.intervals.entry(def.id.clone()).or_insert(IntervalState {
                created_at: now,
                last_fire: None,
            });
        }

        self.definitions = map;
    }

    pub fn get(&self, id: &str) -> Option<&ConditionDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Evaluate a condition without side effects.
    ///
    /// A true result for a `TimeInterval` is not consumed; call
    /// [`consume`](Self::consume) when acting on it.
    pub fn probe(
        &self,
        id: &str,
        now: Instant,
        sampler: &dyn ScreenSampler,
    ) -> Result<bool, EvalError> {
        let mut path = Vec::new();
        self.probe_inner(id, now, sampler, &mut path)
    }

    fn probe_inner(
        &self,
        id: &str,
        now: Instant,
        sampler: &dyn ScreenSampler,
        path: &mut Vec<String>,
    ) -> Result<bool, EvalError> {
        let Some(def) = self.definitions.get(id) else {
            return Err(EvalError::UnknownCondition(id.to_string()));
        };
        if !def.enabled {
            return Ok(false);
        }

        match &def.kind {
            ConditionKind::ColorMatch { region, target_color, tolerance } => {
                if region.is_degenerate() {
                    return Err(EvalError::DegenerateRegion { id: id.to_string() });
                }
                let sampled = sampler
                    .average_color(*region)
                    .map_err(|source| EvalError::Capture { id: id.to_string(), source })?;
                Ok(sampled.distance(target_color) <= *tolerance)
            }

            ConditionKind::TimeInterval { interval_secs, initial_delay_secs } => {
                // State is seeded at swap time; a miss here means the id
                // was never registered, which reads as "not yet due".
                let Some(state) = self.intervals.get(id) else {
                    return Ok(false);
                };
                Ok(interval_due(state, *interval_secs, *initial_delay_secs)
                    .is_some_and(|due| now >= due))
            }

            ConditionKind::Combo { combo_type, children } => {
                // Path-based cycle detection: an id reappearing on the
                // current evaluation path is a cycle, not a shared child.
                if path.iter().any(|seen| seen == id) || path.len() >= MAX_COMBO_DEPTH {
                    return Err(EvalError::RecursionLimit(id.to_string()));
                }
                // An empty combo can never fire, AND or OR alike.
                if children.is_empty() {
                    return Ok(false);
                }

                path.push(id.to_string());
                let result = self.probe_children(id, combo_type, children, now, sampler, path);
                path.pop();
                result
            }
        }
    }

    fn probe_children(
        &self,
        parent: &str,
        combo_type: &ComboType,
        children: &[String],
        now: Instant,
        sampler: &dyn ScreenSampler,
        path: &mut Vec<String>,
    ) -> Result<bool, EvalError> {
        for child in children {
            if !self.definitions.contains_key(child) {
                return Err(EvalError::UnresolvedChild {
                    parent: parent.to_string(),
                    child: child.clone(),
                });
            }
            let value = self.probe_inner(child, now, sampler, path)?;
            match combo_type {
                // AND short-circuits on the first false child.
                ComboType::And if !value => return Ok(false),
                // OR short-circuits on the first true child.
                ComboType::Or if value => return Ok(true),
                _ => {}
            }
        }
        Ok(matches!(combo_type, ComboType::And))
    }

    /// Advance interval state after acting on a true probe.
    ///
    /// Recurses into combos so that an interval gating a fired skill is
    /// consumed wherever it sits in the tree. Only intervals that are
    /// due at `now` advance: an interval sitting in the false branch of
    /// an OR keeps its original schedule. Color matches and missing
    /// children are ignored; this never fails.
    pub fn consume(&mut self, id: &str, now: Instant) {
        self.consume_inner(id, now, 0);
    }

    fn consume_inner(&mut self, id: &str, now: Instant, depth: usize) {
        if depth >= MAX_COMBO_DEPTH {
            return;
        }
        let Some(def) = self.definitions.get(id) else {
            return;
        };
        if !def.enabled {
            return;
        }
        match &def.kind {
            ConditionKind::TimeInterval { interval_secs, initial_delay_secs } => {
                if let Some(state) = self.intervals.get_mut(id) {
                    let due = interval_due(state, *interval_secs, *initial_delay_secs);
                    if due.is_some_and(|due| now >= due) {
                        state.last_fire = Some(now);
                    }
                }
            }
            ConditionKind::Combo { children, .. } => {
                for child in children.clone() {
                    self.consume_inner(&child, now, depth + 1);
                }
            }
            ConditionKind::ColorMatch { .. } => {}
        }
    }
}

/// When the interval next evaluates true. `None` means the deadline is
/// beyond what an `Instant` can represent, i.e. never.
fn interval_due(state: &IntervalState, interval_secs: f32, initial_delay_secs: f32) -> Option<Instant> {
    match state.last_fire {
        Some(last) => last.checked_add(duration_from_secs(interval_secs)),
        None => state.created_at.checked_add(duration_from_secs(initial_delay_secs)),
    }
}

//! Condition definition types.
//!
//! Definitions are templates created by the config UI and persisted as
//! JSON records keyed by `id`. The engine only ever reads them; all
//! runtime state (interval bookkeeping) lives in the engine itself.

use keyrota_types::{ComboType, Region, Rgb, default_tolerance, default_true};
use serde::{Deserialize, Serialize};

/// A named boolean predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// Unique identifier (e.g., "boss_enraged")
    pub id: String,

    /// Whether this condition can currently evaluate true at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// What kind of predicate this is
    #[serde(flatten)]
    pub kind: ConditionKind,
}

/// The three condition kinds, as a tagged sum type so evaluation is an
/// exhaustive match rather than dispatch on type strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionKind {
    /// True while the region's average color is within `tolerance` of
    /// `target_color` (Euclidean distance in channel space).
    ColorMatch {
        region: Region,
        target_color: Rgb,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },

    /// True once per `interval_secs` after an initial delay. The first
    /// evaluation window opens `initial_delay_secs` after the engine
    /// first sees the definition.
    TimeInterval {
        interval_secs: f32,
        #[serde(default)]
        initial_delay_secs: f32,
    },

    /// AND/OR aggregation over other conditions, referenced by id.
    /// Children may themselves be combos; the engine bounds nesting.
    Combo {
        #[serde(default)]
        combo_type: ComboType,
        #[serde(default)]
        children: Vec<String>,
    },
}

impl ConditionDefinition {
    /// True for kinds that need the interval bookkeeping the engine keeps.
    pub fn is_interval(&self) -> bool {
        matches!(self.kind, ConditionKind::TimeInterval { .. })
    }
}

//! Shared configuration types for keyrota.
//!
//! Pure data: everything here is serde-(de)serializable and free of IO,
//! so both the engine crate and any frontend can depend on it.

pub mod color;
pub mod geometry;

pub use color::Rgb;
pub use geometry::Region;

use serde::{Deserialize, Serialize};

/// How a combo condition aggregates its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboType {
    /// All children must be true. An empty AND can never fire.
    #[default]
    And,
    /// At least one child must be true. An empty OR can never fire.
    Or,
}

// ─── Serde default helpers ───────────────────────────────────────────────────
// Shared by the definition types in keyrota-core so that records persisted
// with optional fields omitted parse with the documented defaults.

pub fn default_true() -> bool {
    true
}

/// Default color-match tolerance in channel-space distance.
pub fn default_tolerance() -> f32 {
    20.0
}

/// Default template-match score threshold.
pub fn default_match_threshold() -> f32 {
    0.7
}

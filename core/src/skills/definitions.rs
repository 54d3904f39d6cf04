//! Skill definition types (persisted JSON records).

use keyrota_types::{Region, default_match_threshold, default_true};
use serde::{Deserialize, Serialize};

/// Visual availability probe for a skill's icon slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconProbe {
    /// Where the icon sits on screen.
    pub region: Region,

    /// Template identifier resolved by the capture backend (usually an
    /// image path). `None` means visual availability is assumed.
    #[serde(default)]
    pub template: Option<String>,

    /// Minimum template-match score.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
}

/// A macro action bound to a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Unique identifier (e.g., "heal_burst")
    pub id: String,

    /// Display name shown in the UI and in emitted events
    pub name: String,

    /// Input symbol to inject when the skill fires
    pub key: String,

    /// Lower value = higher priority. Ties break by pool order.
    pub priority: i32,

    /// Minimum seconds between consecutive firings
    #[serde(default)]
    pub cooldown_secs: f32,

    /// Hold time between press and release
    #[serde(default)]
    pub press_delay_secs: f32,

    /// Settle time after release before the tick continues
    #[serde(default)]
    pub release_delay_secs: f32,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Optional icon-region availability gate
    #[serde(default)]
    pub icon: Option<IconProbe>,

    /// Condition ids that must ALL evaluate true (implicit AND).
    /// Empty means always condition-eligible.
    #[serde(default)]
    pub trigger_conditions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_record_gets_documented_defaults() {
        let json = r#"{
            "id": "attack",
            "name": "Attack",
            "key": "1",
            "priority": 3
        }"#;
        let def: SkillDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.cooldown_secs, 0.0);
        assert_eq!(def.press_delay_secs, 0.0);
        assert!(def.enabled);
        assert!(def.icon.is_none());
        assert!(def.trigger_conditions.is_empty());
    }

    #[test]
    fn icon_threshold_defaults() {
        let json = r#"{
            "id": "heal",
            "name": "Heal",
            "key": "2",
            "priority": 0,
            "icon": {
                "region": { "x1": 0, "y1": 0, "x2": 32, "y2": 32 },
                "template": "icons/heal.png"
            }
        }"#;
        let def: SkillDefinition = serde_json::from_str(json).unwrap();
        let icon = def.icon.unwrap();
        assert_eq!(icon.match_threshold, 0.7);
        assert_eq!(icon.template.as_deref(), Some("icons/heal.png"));
    }
}

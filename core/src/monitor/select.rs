//! Health estimation and auto-select.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;

use keyrota_types::{Region, Rgb, default_tolerance, default_true};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::clock::{Clock, duration_from_secs};
use crate::events::{SchedulerEvent, now_local};
use crate::input::{InputInjector, MouseState};
use crate::screen::{CaptureError, ScreenSampler};

/// A teammate whose health bar the monitor watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeammateDefinition {
    /// Unique identifier (e.g., "slot_3")
    pub id: String,

    /// Display name for events and the UI
    pub name: String,

    /// Profession tag, compared against the priority profession
    #[serde(default)]
    pub profession: String,

    /// Key that selects this teammate in game
    pub select_key: String,

    /// The teammate's health bar rectangle
    pub bar_region: Region,

    /// Color of the filled portion of the bar
    pub bar_color: Rgb,

    /// Color-match tolerance for "this slice is still filled"
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Monitor behavior knobs; part of the application config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Master switch; the supervisor skips the monitor tick when off.
    pub enabled: bool,

    /// Minimum seconds between consecutive auto-selections. Independent
    /// of any skill cooldown.
    pub cooldown_secs: f32,

    /// Only teammates below this health percentage are candidates.
    pub threshold_pct: f32,

    /// Teammates with this profession get a 10-point health handicap,
    /// so they win ties against equally hurt teammates.
    pub priority_profession: Option<String>,

    /// How many vertical slices to sample per bar.
    pub sample_columns: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            cooldown_secs: 3.0,
            threshold_pct: 90.0,
            priority_profession: None,
            sample_columns: 10,
        }
    }
}

/// What a single monitor tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    Disabled,
    /// Right mouse button held: the player is aiming, stay out of the way.
    Suppressed,
    OnCooldown,
    /// Everyone is above the threshold (or unreadable).
    NoCandidate,
    Selected { teammate_id: String, health_pct: f32 },
    InjectionFailed { teammate_id: String },
}

/// Estimate the filled fraction of a health bar, as a percentage.
///
/// The bar is split into vertical slices scanned left to right; a slice
/// counts as filled while its average color stays within `tolerance` of
/// `bar_color`. Scanning stops at the first unfilled slice, since bars
/// drain from the right.
pub fn estimate_health(
    sampler: &dyn ScreenSampler,
    region: Region,
    bar_color: Rgb,
    tolerance: f32,
    columns: u32,
) -> Result<f32, CaptureError> {
    let slices = region.vertical_slices(columns);
    if slices.is_empty() {
        return Err(CaptureError::OutOfBounds(region));
    }
    let total = slices.len();
    let mut filled = 0usize;
    for slice in slices {
        let avg = sampler.average_color(slice)?;
        if avg.distance(&bar_color) <= tolerance {
            filled += 1;
        } else {
            break;
        }
    }
    // Multiply before dividing so whole-percent ratios come out exact.
    Ok((filled * 100) as f32 / total as f32)
}

/// Owns the teammate pool and the monitor's own cooldown state.
pub struct HealthMonitor {
    teammates: Vec<TeammateDefinition>,
    settings: MonitorSettings,
    last_select: Option<Instant>,
    sampler: Arc<dyn ScreenSampler>,
    injector: Arc<dyn InputInjector>,
    mouse: Arc<dyn MouseState>,
    clock: Arc<dyn Clock>,
    events: Option<mpsc::Sender<SchedulerEvent>>,
    reported_faults: HashSet<String>,
}

impl HealthMonitor {
    pub fn new(
        settings: MonitorSettings,
        sampler: Arc<dyn ScreenSampler>,
        injector: Arc<dyn InputInjector>,
        mouse: Arc<dyn MouseState>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            teammates: Vec::new(),
            settings,
            last_select: None,
            sampler,
            injector,
            mouse,
            clock,
            events: None,
            reported_faults: HashSet::new(),
        }
    }

    pub fn set_events(&mut self, events: mpsc::Sender<SchedulerEvent>) {
        self.events = Some(events);
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: MonitorSettings) {
        self.settings = settings;
    }

    /// Replace the teammate pool wholesale. Pool order is the tie-break
    /// for equal scores, so it is preserved as given.
    pub fn swap_teammates(&mut self, teammates: Vec<TeammateDefinition>) {
        self.teammates = teammates;
        self.reported_faults.clear();
    }

    /// Run one monitor tick: select at most one teammate.
    pub fn run_tick(&mut self) -> MonitorOutcome {
        if !self.settings.enabled {
            return MonitorOutcome::Disabled;
        }
        if self.mouse.right_button_held() {
            return MonitorOutcome::Suppressed;
        }

        let now = self.clock.now();
        if let Some(last) = self.last_select {
            // An unrepresentable deadline means the cooldown never ends.
            match last.checked_add(duration_from_secs(self.settings.cooldown_secs)) {
                Some(ready_at) if now >= ready_at => {}
                _ => return MonitorOutcome::OnCooldown,
            }
        }

        // Score every readable teammate; lower score = more at risk.
        let mut winner: Option<(usize, f32, f32)> = None; // (idx, score, health)
        for (idx, teammate) in self.teammates.iter().enumerate() {
            if !teammate.enabled {
                continue;
            }
            let health = match estimate_health(
                &*self.sampler,
                teammate.bar_region,
                teammate.bar_color,
                teammate.tolerance,
                self.settings.sample_columns,
            ) {
                Ok(pct) => pct,
                Err(err) => {
                    if self.reported_faults.insert(teammate.id.clone()) {
                        warn!(teammate = %teammate.id, %err, "health bar unreadable, skipping");
                    }
                    continue;
                }
            };
            if health >= self.settings.threshold_pct {
                continue;
            }

            let score = self.score(teammate, health);
            // Strict comparison keeps the earlier pool slot on ties.
            let better = match winner {
                None => true,
                Some((_, best, _)) => score < best,
            };
            if better {
                winner = Some((idx, score, health));
            }
        }

        let Some((idx, _, health)) = winner else {
            return MonitorOutcome::NoCandidate;
        };
        self.select(idx, health)
    }

    fn score(&self, teammate: &TeammateDefinition, health: f32) -> f32 {
        let prioritized = self
            .settings
            .priority_profession
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(&teammate.profession));
        if prioritized { health - 10.0 } else { health }
    }

    fn select(&mut self, idx: usize, health: f32) -> MonitorOutcome {
        let teammate = self.teammates[idx].clone();

        let injected = self
            .injector
            .press(&teammate.select_key)
            .and_then(|()| self.injector.release(&teammate.select_key));
        if let Err(err) = injected {
            error!(teammate = %teammate.id, %err, "teammate selection failed");
            if let Some(events) = &self.events {
                let _ = events.send(SchedulerEvent::InjectionFailed {
                    source_id: teammate.id.clone(),
                    reason: err.to_string(),
                    timestamp: now_local(),
                });
            }
            return MonitorOutcome::InjectionFailed { teammate_id: teammate.id };
        }

        // Cooldown measured from after the injection landed.
        self.last_select = Some(self.clock.now());
        debug!(teammate = %teammate.id, health, "teammate auto-selected");
        if let Some(events) = &self.events {
            let _ = events.send(SchedulerEvent::TeammateSelected {
                teammate_id: teammate.id.clone(),
                teammate_name: teammate.name.clone(),
                health_pct: health,
                timestamp: now_local(),
            });
        }
        MonitorOutcome::Selected { teammate_id: teammate.id, health_pct: health }
    }
}

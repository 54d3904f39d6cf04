//! Hand-rolled capability fakes shared by the test modules.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use keyrota_types::{Region, Rgb};

use crate::clock::Clock;
use crate::hotkeys::{HotkeyError, HotkeyHandle, HotkeyRegistry};
use crate::input::{InjectorError, InputInjector, MouseState};
use crate::screen::{CaptureError, ScreenSampler};

// ─────────────────────────────────────────────────────────────────────────────
// ScriptedSampler
// ─────────────────────────────────────────────────────────────────────────────

/// A sampler answering from scripted per-region colors and per-template
/// match results. Records every `average_color` call so tests can assert
/// short-circuiting.
#[derive(Default)]
pub struct ScriptedSampler {
    colors: Mutex<HashMap<Region, Rgb>>,
    templates: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<Region>>,
    fail_all: AtomicBool,
}

impl ScriptedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_color(&self, region: Region, color: Rgb) {
        self.colors.lock().unwrap().insert(region, color);
    }

    pub fn set_template(&self, template: &str, matched: bool) {
        self.templates.lock().unwrap().insert(template.to_string(), matched);
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of `average_color` calls made so far.
    pub fn sample_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ScreenSampler for ScriptedSampler {
    fn average_color(&self, region: Region) -> Result<Rgb, CaptureError> {
        self.calls.lock().unwrap().push(region);
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(CaptureError::Backend("scripted failure".into()));
        }
        // Unscripted regions read as black.
        Ok(*self.colors.lock().unwrap().get(&region).unwrap_or(&Rgb(0, 0, 0)))
    }

    fn template_match(
        &self,
        _region: Region,
        template: &str,
        _threshold: f32,
    ) -> Result<bool, CaptureError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(CaptureError::Backend("scripted failure".into()));
        }
        // Unscripted templates match, so plain skills stay eligible.
        Ok(*self.templates.lock().unwrap().get(template).unwrap_or(&true))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RecordingInjector
// ─────────────────────────────────────────────────────────────────────────────

/// Records press/release calls as `"press <key>"` / `"release <key>"`.
#[derive(Default)]
pub struct RecordingInjector {
    log: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn keys_pressed(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|entry| entry.strip_prefix("press ").map(str::to_string))
            .collect()
    }
}

impl InputInjector for RecordingInjector {
    fn press(&self, key: &str) -> Result<(), InjectorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(InjectorError::Backend("scripted failure".into()));
        }
        self.log.lock().unwrap().push(format!("press {key}"));
        Ok(())
    }

    fn release(&self, key: &str) -> Result<(), InjectorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(InjectorError::Backend("scripted failure".into()));
        }
        self.log.lock().unwrap().push(format!("release {key}"));
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ManualClock
// ─────────────────────────────────────────────────────────────────────────────

/// A clock driven by the test. `sleep` advances time instantly, so press
/// delays and tick sleeps cost nothing in tests.
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Mutex::new(Instant::now()) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StaticMouse
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StaticMouse {
    right_held: AtomicBool,
}

impl StaticMouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_right_held(&self, held: bool) {
        self.right_held.store(held, Ordering::SeqCst);
    }
}

impl MouseState for StaticMouse {
    fn right_button_held(&self) -> bool {
        self.right_held.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FakeRegistry
// ─────────────────────────────────────────────────────────────────────────────

type Callback = Box<dyn Fn() + Send + Sync>;

/// In-memory hotkey registry. Tests fire registered combos by name.
#[derive(Default)]
pub struct FakeRegistry {
    bindings: Mutex<HashMap<u64, (String, Callback)>>,
    next_handle: AtomicU64,
    reject: Mutex<Option<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make future registrations of `combo` fail.
    pub fn reject(&self, combo: &str) {
        *self.reject.lock().unwrap() = Some(combo.to_string());
    }

    pub fn registered_combos(&self) -> Vec<String> {
        let mut combos: Vec<String> = self
            .bindings
            .lock()
            .unwrap()
            .values()
            .map(|(combo, _)| combo.clone())
            .collect();
        combos.sort();
        combos
    }

    /// Invoke the callbacks bound to `combo`, as the OS would.
    pub fn fire(&self, combo: &str) {
        // Callbacks run under the lock; fine for tests, where callbacks
        // only post to channels.
        let bindings = self.bindings.lock().unwrap();
        for (bound, callback) in bindings.values() {
            if bound == combo {
                callback();
            }
        }
    }
}

impl HotkeyRegistry for FakeRegistry {
    fn register(
        &self,
        combo: &str,
        callback: Callback,
    ) -> Result<HotkeyHandle, HotkeyError> {
        if self.reject.lock().unwrap().as_deref() == Some(combo) {
            return Err(HotkeyError::Registration {
                combo: combo.to_string(),
                reason: "scripted rejection".into(),
            });
        }
        let handle = HotkeyHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.bindings
            .lock()
            .unwrap()
            .insert(handle.0, (combo.to_string(), callback));
        Ok(handle)
    }

    fn unregister(&self, handle: HotkeyHandle) {
        self.bindings.lock().unwrap().remove(&handle.0);
    }
}

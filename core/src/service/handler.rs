//! Handle for talking to the supervisor thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use crate::conditions::ConditionDefinition;
use crate::hotkeys::{self, HotkeyError, HotkeyHandle, HotkeyRegistry};
use crate::monitor::{MonitorSettings, TeammateDefinition};
use crate::skills::SkillDefinition;

use super::ServiceCommand;

/// Outcome of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    AlreadyRunning,
}

/// Outcome of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStatus {
    Stopped,
    NotRunning,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The supervisor thread is gone.
    #[error("scheduler service is not available")]
    Disconnected,

    /// The supervisor did not acknowledge within the bounded wait.
    #[error("scheduler service did not respond in time")]
    Timeout,

    #[error("failed to spawn supervisor thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// State shared between the supervisor thread and its handles.
pub(crate) struct SharedState {
    pub(crate) running: AtomicBool,
}

/// A registered start/stop hotkey pair.
struct HotkeyPair {
    start_combo: String,
    start_handle: HotkeyHandle,
    stop_combo: String,
    stop_handle: HotkeyHandle,
}

/// Handle to the scheduler service: lifecycle, hotkeys, pool swaps.
///
/// Cloneable; all clones talk to the same supervisor thread.
#[derive(Clone)]
pub struct ServiceHandle {
    cmd_tx: Sender<ServiceCommand>,
    shared: Arc<SharedState>,
    registry: Arc<dyn HotkeyRegistry>,
    bindings: Arc<Mutex<Option<HotkeyPair>>>,
    ack_timeout: Duration,
}

impl ServiceHandle {
    pub(crate) fn new(
        cmd_tx: Sender<ServiceCommand>,
        shared: Arc<SharedState>,
        registry: Arc<dyn HotkeyRegistry>,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            cmd_tx,
            shared,
            registry,
            bindings: Arc::new(Mutex::new(None)),
            ack_timeout,
        }
    }

    /// Whether the scheduler loop is currently running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Start the scheduler loop. Idempotent: a second call reports
    /// [`StartStatus::AlreadyRunning`] and changes nothing.
    pub fn start(&self) -> Result<StartStatus, ServiceError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(ServiceCommand::Start { reply: Some(reply_tx) })
            .map_err(|_| ServiceError::Disconnected)?;
        reply_rx
            .recv_timeout(self.ack_timeout)
            .map_err(|_| ServiceError::Timeout)
    }

    /// Stop the scheduler loop. Once this returns `Ok`, no further input
    /// injection from this scheduler will occur. An in-flight
    /// press/release sequence is allowed to finish first, which is what
    /// the bounded wait covers; on timeout a warning is logged and the
    /// caller gets [`ServiceError::Timeout`] instead of a deadlock.
    pub fn stop(&self) -> Result<StopStatus, ServiceError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(ServiceCommand::Stop { reply: Some(reply_tx) })
            .map_err(|_| ServiceError::Disconnected)?;
        reply_rx.recv_timeout(self.ack_timeout).map_err(|err| {
            warn!(%err, "scheduler did not acknowledge stop in time");
            ServiceError::Timeout
        })
    }

    /// Replace skills and conditions wholesale. Applied between ticks,
    /// so the loop never observes a half-updated pool.
    pub fn swap_pool(
        &self,
        skills: Vec<SkillDefinition>,
        conditions: Vec<ConditionDefinition>,
    ) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(ServiceCommand::SwapPool { skills, conditions })
            .map_err(|_| ServiceError::Disconnected)
    }

    pub fn swap_teammates(&self, teammates: Vec<TeammateDefinition>) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(ServiceCommand::SwapTeammates { teammates })
            .map_err(|_| ServiceError::Disconnected)
    }

    pub fn set_monitor_settings(&self, settings: MonitorSettings) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(ServiceCommand::SetMonitorSettings { settings })
            .map_err(|_| ServiceError::Disconnected)
    }

    /// Register global start/stop hotkeys, replacing any previous pair.
    ///
    /// Old bindings are fully unregistered before the new ones are
    /// installed, so a combo moving from one role to the other can never
    /// double-fire. The swap is all-or-nothing: if either registration
    /// fails, the previous pair is restored and the error returned.
    pub fn set_hotkeys(&self, start_key: &str, stop_key: &str) -> Result<(), HotkeyError> {
        hotkeys::validate_pair(start_key, stop_key)?;
        let start_key = start_key.trim();
        let stop_key = stop_key.trim();

        let mut guard = lock_bindings(&self.bindings);
        let previous = guard.take();
        if let Some(pair) = &previous {
            self.registry.unregister(pair.start_handle);
            self.registry.unregister(pair.stop_handle);
        }

        match self.register_pair(start_key, stop_key) {
            Ok(pair) => {
                info!(start = %start_key, stop = %stop_key, "global hotkeys registered");
                *guard = Some(pair);
                Ok(())
            }
            Err(err) => {
                *guard = self.restore_pair(previous);
                Err(err)
            }
        }
    }

    /// Unregister the current hotkey pair, if any.
    pub fn clear_hotkeys(&self) {
        let mut guard = lock_bindings(&self.bindings);
        if let Some(pair) = guard.take() {
            self.registry.unregister(pair.start_handle);
            self.registry.unregister(pair.stop_handle);
        }
    }

    /// Ask the supervisor thread to exit. The loop is stopped first if
    /// it was running.
    pub fn shutdown(&self) -> Result<(), ServiceError> {
        self.clear_hotkeys();
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(ServiceCommand::Shutdown { reply: reply_tx })
            .map_err(|_| ServiceError::Disconnected)?;
        reply_rx
            .recv_timeout(self.ack_timeout)
            .map_err(|_| ServiceError::Timeout)
    }

    fn register_pair(&self, start_key: &str, stop_key: &str) -> Result<HotkeyPair, HotkeyError> {
        let start_handle = self.registry.register(start_key, self.command_callback(true))?;
        match self.registry.register(stop_key, self.command_callback(false)) {
            Ok(stop_handle) => Ok(HotkeyPair {
                start_combo: start_key.to_string(),
                start_handle,
                stop_combo: stop_key.to_string(),
                stop_handle,
            }),
            Err(err) => {
                self.registry.unregister(start_handle);
                Err(err)
            }
        }
    }

    /// Re-register a previously active pair after a failed swap.
    fn restore_pair(&self, previous: Option<HotkeyPair>) -> Option<HotkeyPair> {
        let previous = previous?;
        match self.register_pair(&previous.start_combo, &previous.stop_combo) {
            Ok(pair) => Some(pair),
            Err(err) => {
                // The old combos were unregistered and cannot come back;
                // the caller ends up with no bindings at all.
                warn!(%err, "failed to restore previous hotkeys after swap failure");
                None
            }
        }
    }

    /// Build a hotkey callback that posts Start or Stop, fire-and-forget.
    fn command_callback(&self, start: bool) -> Box<dyn Fn() + Send + Sync> {
        let cmd_tx = self.cmd_tx.clone();
        Box::new(move || {
            let cmd = if start {
                ServiceCommand::Start { reply: None }
            } else {
                ServiceCommand::Stop { reply: None }
            };
            let _ = cmd_tx.send(cmd);
        })
    }
}

fn lock_bindings(
    bindings: &Mutex<Option<HotkeyPair>>,
) -> std::sync::MutexGuard<'_, Option<HotkeyPair>> {
    // Binding state stays usable even if a panicking thread poisoned it.
    bindings.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

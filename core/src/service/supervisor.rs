//! The supervisor thread: state machine and tick loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::events::{SchedulerEvent, now_local};
use crate::hotkeys::HotkeyRegistry;
use crate::input::{InputInjector, MouseState};
use crate::monitor::HealthMonitor;
use crate::scheduler::SkillScheduler;
use crate::screen::ScreenSampler;

use super::handler::{ServiceError, ServiceHandle, SharedState, StartStatus, StopStatus};
use super::ServiceCommand;

/// Spawn the supervisor thread.
///
/// Returns the cloneable handle plus the event stream. The thread exits
/// on [`ServiceHandle::shutdown`] or when every handle is dropped.
pub fn spawn(
    config: &AppConfig,
    sampler: Arc<dyn ScreenSampler>,
    injector: Arc<dyn InputInjector>,
    mouse: Arc<dyn MouseState>,
    registry: Arc<dyn HotkeyRegistry>,
    clock: Arc<dyn Clock>,
) -> Result<(ServiceHandle, mpsc::Receiver<SchedulerEvent>), ServiceError> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();
    let shared = Arc::new(SharedState { running: AtomicBool::new(false) });

    let mut scheduler = SkillScheduler::new(sampler.clone(), injector.clone(), clock.clone());
    scheduler.set_events(event_tx.clone());
    let mut monitor = HealthMonitor::new(
        config.monitor.clone(),
        sampler,
        injector,
        mouse,
        clock.clone(),
    );
    monitor.set_events(event_tx.clone());

    let supervisor = Supervisor {
        scheduler,
        monitor,
        cmd_rx,
        shared: shared.clone(),
        clock,
        tick_interval: config.tick_interval(),
        events: event_tx,
        running: false,
        exit: false,
    };

    std::thread::Builder::new()
        .name("keyrota-supervisor".to_string())
        .spawn(move || supervisor.run())
        .map_err(ServiceError::Spawn)?;

    let handle = ServiceHandle::new(cmd_tx, shared, registry, config.stop_join_timeout());
    Ok((handle, event_rx))
}

struct Supervisor {
    scheduler: SkillScheduler,
    monitor: HealthMonitor,
    cmd_rx: Receiver<ServiceCommand>,
    shared: Arc<SharedState>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    events: mpsc::Sender<SchedulerEvent>,
    running: bool,
    exit: bool,
}

impl Supervisor {
    fn run(mut self) {
        info!("supervisor thread started");
        loop {
            if self.exit {
                break;
            }
            if self.running {
                if !self.running_tick() {
                    break;
                }
            } else {
                // Idle: nothing to poll, just wait for the next command.
                match self.cmd_rx.recv() {
                    Ok(cmd) => self.handle_command(cmd),
                    Err(_) => break, // every handle dropped
                }
            }
        }
        self.shared.running.store(false, Ordering::SeqCst);
        info!("supervisor thread exiting");
    }

    /// One running iteration: drain commands, tick, sleep the remainder.
    /// Returns false when the thread should exit.
    fn running_tick(&mut self) -> bool {
        let tick_start = self.clock.now();

        // Commands are honored between ticks only; an in-flight
        // press/release sequence always completes first.
        loop {
            match self.cmd_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
        if self.exit || !self.running {
            // A Stop was drained (and acknowledged); no injection below
            // this point.
            return true;
        }

        self.scheduler.run_tick();
        self.monitor.run_tick();

        let elapsed = self.clock.now().saturating_duration_since(tick_start);
        self.clock.sleep(self.tick_interval.saturating_sub(elapsed));
        true
    }

    fn handle_command(&mut self, cmd: ServiceCommand) {
        match cmd {
            ServiceCommand::Start { reply } => {
                let status = if self.running {
                    StartStatus::AlreadyRunning
                } else {
                    self.running = true;
                    self.shared.running.store(true, Ordering::SeqCst);
                    info!("scheduler started");
                    let _ = self
                        .events
                        .send(SchedulerEvent::Started { timestamp: now_local() });
                    StartStatus::Started
                };
                if let Some(reply) = reply {
                    let _ = reply.send(status);
                }
            }

            ServiceCommand::Stop { reply } => {
                let status = if self.running {
                    self.running = false;
                    self.shared.running.store(false, Ordering::SeqCst);
                    info!("scheduler stopped");
                    let _ = self
                        .events
                        .send(SchedulerEvent::Stopped { timestamp: now_local() });
                    StopStatus::Stopped
                } else {
                    StopStatus::NotRunning
                };
                if let Some(reply) = reply {
                    let _ = reply.send(status);
                }
            }

            ServiceCommand::SwapPool { skills, conditions } => {
                self.scheduler.swap_pool(skills, conditions);
            }

            ServiceCommand::SwapTeammates { teammates } => {
                self.monitor.swap_teammates(teammates);
            }

            ServiceCommand::SetMonitorSettings { settings } => {
                self.monitor.set_settings(settings);
            }

            ServiceCommand::Shutdown { reply } => {
                if self.running {
                    warn!("shutdown while running, stopping scheduler");
                    self.running = false;
                    self.shared.running.store(false, Ordering::SeqCst);
                }
                let _ = reply.send(());
                self.exit = true;
            }
        }
    }
}

//! Timer engine.
//!
//! Composes the [`Ticker`] and [`SessionMachine`] behind one lock and
//! publishes every state change on a [`StateChannel`]. The engine has no
//! dependency on any screen: it keeps ticking and keeps state with zero
//! subscribers, and a host that reattaches calls [`TimerEngine::resync`].
//!
//! ## Concurrency
//!
//! The tick handler and every public operation take the same mutex, so at
//! most one of them touches the session at a time. Each ticker is tagged
//! with a generation number; pausing or stopping bumps the generation before
//! releasing the lock, so a tick that was already waiting on the lock finds
//! itself stale and does nothing. Persistence writes are queued, never
//! awaited. The alarm collaborator is invoked after the lock is released.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = TimerEngine::new(store, alarm, EngineOptions::default())?;
//! let mut sub = engine.subscribe();
//! engine.start(Mode::Focus, 1500, "draft chapter")?;
//! while let Some(event) = sub.recv().await { /* render */ }
//! ```

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;

use super::mode::Mode;
use super::session::{Completion, SessionMachine, Snapshot, TickOutcome, TimerState};
use super::ticker::Ticker;
use crate::alarm::AlarmTrigger;
use crate::channel::{StateChannel, Subscription};
use crate::error::EngineError;
use crate::events::Event;
use crate::notify::NotificationAction;
use crate::storage::{Config, PersistenceStore, PersistenceWriter};

/// Tunables the host passes in at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Length of a snoozed focus session.
    pub snooze_secs: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { snooze_secs: 5 * 60 }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            snooze_secs: config.snooze_secs(),
        }
    }
}

struct Inner {
    machine: SessionMachine,
    ticker: Ticker,
    /// Bumped whenever the ticker is (re)started or cancelled.
    generation: u64,
    last_task: String,
}

struct Shared {
    inner: Mutex<Inner>,
    channel: StateChannel,
    alarm: Arc<dyn AlarmTrigger>,
    writer: PersistenceWriter,
    runtime: Handle,
    options: EngineOptions,
}

/// Handle to the session engine. Cheap to clone; all clones drive the same
/// session.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("snapshot", &self.shared.channel.latest())
            .finish()
    }
}

impl TimerEngine {
    /// Create an idle engine seeded from `store`.
    ///
    /// Must be called from within a Tokio runtime; ticks and persistence
    /// writes run on it. Read failures fall back to the documented defaults.
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        alarm: Arc<dyn AlarmTrigger>,
        options: EngineOptions,
    ) -> Result<Self, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let completed = store.completed_count().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read completed count, starting from 0");
            0
        });
        let last_task = store.last_task().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read last task");
            String::new()
        });

        let machine = SessionMachine::new(completed);
        let channel = StateChannel::new(machine.snapshot());
        let writer = PersistenceWriter::spawn(&runtime, store);

        tracing::debug!(completed, "timer engine created");
        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    machine,
                    ticker: Ticker::new(),
                    generation: 0,
                    last_task,
                }),
                channel,
                alarm,
                writer,
                runtime,
                options,
            }),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Most recently published snapshot. Call after (re)attaching.
    pub fn resync(&self) -> Snapshot {
        self.shared.channel.latest()
    }

    pub fn subscribe(&self) -> Subscription {
        self.shared.channel.subscribe()
    }

    pub fn state(&self) -> TimerState {
        self.shared.lock().machine.state()
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.shared.lock().machine.completed_focus_count()
    }

    pub fn last_task(&self) -> String {
        self.shared.lock().last_task.clone()
    }

    pub fn options(&self) -> EngineOptions {
        self.shared.options
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session, replacing any active one.
    ///
    /// Fails only for a negative duration, in which case nothing changes.
    /// A zero-length session completes immediately.
    pub fn start(&self, mode: Mode, total_secs: i64, task: &str) -> Result<Snapshot, EngineError> {
        let shared = &self.shared;
        let (snapshot, completion) = {
            let mut inner = shared.lock();
            let completion = inner.machine.start(mode, total_secs, task)?;
            inner.last_task = task.to_string();
            shared.writer.set_last_task(task);
            tracing::info!(%mode, total_secs, task, "session started");

            match completion {
                Some(completion) => (shared.finish(&mut inner, completion), Some(completion)),
                None => {
                    shared.start_ticking(&mut inner);
                    (shared.publish(&inner), None)
                }
            }
        };
        if let Some(completion) = completion {
            shared.ring(completion);
        }
        Ok(snapshot)
    }

    /// Hold the countdown. No-op unless running.
    pub fn pause(&self) -> Snapshot {
        let shared = &self.shared;
        let mut inner = shared.lock();
        if inner.machine.pause() {
            shared.stop_ticking(&mut inner);
            tracing::info!(remaining = remaining(&inner), "session paused");
            return shared.publish(&inner);
        }
        shared.channel.latest()
    }

    /// Continue a held session. No-op unless paused.
    pub fn resume(&self) -> Snapshot {
        let shared = &self.shared;
        let mut inner = shared.lock();
        if inner.machine.resume() {
            shared.start_ticking(&mut inner);
            tracing::info!(remaining = remaining(&inner), "session resumed");
            return shared.publish(&inner);
        }
        shared.channel.latest()
    }

    /// Pause when running, resume when paused.
    pub fn toggle(&self) -> Snapshot {
        match self.state() {
            TimerState::Running => self.pause(),
            TimerState::Paused => self.resume(),
            TimerState::Idle => self.resync(),
        }
    }

    /// Abandon the session and go idle. Idempotent.
    pub fn stop(&self) -> Snapshot {
        let shared = &self.shared;
        let mut inner = shared.lock();
        shared.stop_ticking(&mut inner);
        if inner.machine.stop() {
            tracing::info!("session stopped");
            return shared.publish(&inner);
        }
        shared.channel.latest()
    }

    /// Rewind to the full duration and hold. No alarm, no counter change.
    pub fn reset(&self) -> Snapshot {
        let shared = &self.shared;
        let mut inner = shared.lock();
        if inner.machine.reset() {
            shared.stop_ticking(&mut inner);
            tracing::info!("session reset");
            return shared.publish(&inner);
        }
        shared.channel.latest()
    }

    /// Complete the current session now, exactly as if it had ticked to
    /// zero. No-op when idle.
    pub fn skip(&self) -> Snapshot {
        let shared = &self.shared;
        let (snapshot, completion) = {
            let mut inner = shared.lock();
            match inner.machine.skip() {
                Some(completion) => (shared.finish(&mut inner, completion), Some(completion)),
                None => (shared.channel.latest(), None),
            }
        };
        if let Some(completion) = completion {
            shared.ring(completion);
        }
        snapshot
    }

    /// Restart focus for the configured snooze length with the last task.
    ///
    /// A snooze is at least one second long, so it never completes on the
    /// spot and never rings or counts.
    pub fn snooze(&self) -> Snapshot {
        let task = self.last_task();
        let secs = self.shared.options.snooze_secs.max(1);
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        match self.start(Mode::Focus, secs, &task) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "snooze rejected");
                self.resync()
            }
        }
    }

    /// Zero the rotation counter (user action).
    pub fn clear_completed(&self) -> Snapshot {
        let shared = &self.shared;
        let mut inner = shared.lock();
        inner.machine.clear_completed();
        shared.writer.clear_completed();
        tracing::info!("completed sessions cleared");
        shared.publish(&inner)
    }

    /// Apply an action from the ongoing-timer notification.
    pub fn handle_notification_action(&self, action: NotificationAction) -> Snapshot {
        match action {
            NotificationAction::PauseResume => self.toggle(),
            NotificationAction::Stop => self.stop(),
        }
    }

    /// Wait until queued persistence writes have been applied.
    pub async fn flush(&self) {
        self.shared.writer.flush().await;
    }

    /// Stop the session and flush persistence.
    pub async fn shutdown(&self) {
        self.stop();
        self.flush().await;
    }
}

fn remaining(inner: &Inner) -> u64 {
    inner
        .machine
        .session()
        .map(|s| s.remaining_secs)
        .unwrap_or(0)
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) -> Snapshot {
        let snapshot = inner.machine.snapshot();
        self.channel.publish_snapshot(snapshot.clone());
        snapshot
    }

    fn start_ticking(self: &Arc<Self>, inner: &mut Inner) {
        inner.generation += 1;
        let generation = inner.generation;
        let engine = Arc::downgrade(self);
        inner.ticker.start(&self.runtime, move || match engine.upgrade() {
            Some(shared) => shared.on_tick(generation),
            None => ControlFlow::Break(()),
        });
    }

    fn stop_ticking(&self, inner: &mut Inner) {
        inner.generation += 1;
        inner.ticker.stop();
    }

    /// Rotate to the next mode and publish `Completed` then the new state.
    /// The caller rings the alarm once the lock is released.
    fn finish(&self, inner: &mut Inner, completion: Completion) -> Snapshot {
        self.stop_ticking(inner);
        if completion.counted() {
            self.writer
                .set_completed_count(completion.completed_focus_count);
        }
        tracing::info!(
            mode = %completion.completed,
            next = %completion.next,
            completed = completion.completed_focus_count,
            skipped = completion.skipped,
            "session completed"
        );
        self.channel.publish(Event::completed(&completion));
        self.publish(inner)
    }

    fn ring(&self, completion: Completion) {
        self.alarm.fire(completion.completed);
    }

    fn on_tick(&self, generation: u64) -> ControlFlow<()> {
        let completion = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return ControlFlow::Break(());
            }
            match inner.machine.tick() {
                TickOutcome::Ignored => return ControlFlow::Break(()),
                TickOutcome::Counted => {
                    tracing::debug!(remaining = remaining(&inner), "tick");
                    self.publish(&inner);
                    return ControlFlow::Continue(());
                }
                TickOutcome::Completed(completion) => {
                    self.finish(&mut inner, completion);
                    completion
                }
            }
        };
        self.ring(completion);
        ControlFlow::Break(())
    }
}

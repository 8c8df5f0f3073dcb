//! Session state machine.
//!
//! Owns the single active [`SessionState`] and the focus completion counter.
//! Pure and synchronous: it does not know about wall-clock time, ticking or
//! observers. The [`TimerEngine`](super::TimerEngine) drives it.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!         Running | Paused --(tick to zero | skip)--> Completed -> Paused(next mode)
//!         Running | Paused --reset--> Paused
//!         any --stop--> Idle
//! ```
//!
//! `Completed` is transient: the machine immediately rotates to the next mode
//! (per [`next_mode`](super::policy::next_mode)) at its nominal duration, not
//! running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mode::Mode;
use super::policy::{next_mode, rotation_position};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// The live countdown record. Observers only ever see clones of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Mode,
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
    #[serde(default)]
    pub task: String,
}

impl SessionState {
    /// A not-yet-started session of `mode` at its nominal duration.
    pub fn ready(mode: Mode, task: impl Into<String>) -> Self {
        let total = mode.nominal_secs();
        Self {
            mode,
            total_secs: total,
            remaining_secs: total,
            running: false,
            task: task.into(),
        }
    }

    /// Remaining time as `MM:SS`. Minutes are not wrapped at 60.
    pub fn remaining_clock(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Remaining fraction in `0.0..=1.0`; a zero-length session reads as full.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 1.0;
        }
        self.remaining_secs as f64 / self.total_secs as f64
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Result of a session reaching zero, naturally or via skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub completed: Mode,
    pub next: Mode,
    /// Counter value after this completion was applied.
    pub completed_focus_count: u32,
    /// `true` when the completion came from `skip`.
    pub skipped: bool,
}

impl Completion {
    /// Whether this completion advanced the rotation counter.
    pub fn counted(&self) -> bool {
        self.completed.counts_toward_rotation()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No running session; nothing changed.
    Ignored,
    /// One second was consumed and time remains.
    Counted,
    Completed(Completion),
}

/// Immutable copy of the machine state handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: TimerState,
    pub session: Option<SessionState>,
    pub completed_focus_count: u32,
    pub at: DateTime<Utc>,
}

impl Snapshot {
    pub fn mode(&self) -> Option<Mode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.session.as_ref().map(|s| s.remaining_secs).unwrap_or(0)
    }

    pub fn total_secs(&self) -> u64 {
        self.session.as_ref().map(|s| s.total_secs).unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_clock(&self) -> String {
        format_clock(self.remaining_secs())
    }

    pub fn progress(&self) -> f64 {
        self.session.as_ref().map(SessionState::progress).unwrap_or(1.0)
    }

    pub fn rotation_position(&self) -> u32 {
        rotation_position(self.completed_focus_count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    session: Option<SessionState>,
    completed_focus: u32,
}

impl SessionMachine {
    /// Idle machine seeded with a persisted focus completion count.
    pub fn new(completed_focus: u32) -> Self {
        Self {
            session: None,
            completed_focus,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match &self.session {
            None => TimerState::Idle,
            Some(s) if s.running => TimerState::Running,
            Some(_) => TimerState::Paused,
        }
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            session: self.session.clone(),
            completed_focus_count: self.completed_focus,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace any active session with a running one.
    ///
    /// A zero-length session completes on the spot and the returned
    /// completion must be handled like a natural expiry.
    pub fn start(
        &mut self,
        mode: Mode,
        total_secs: i64,
        task: impl Into<String>,
    ) -> Result<Option<Completion>, EngineError> {
        let total = u64::try_from(total_secs).map_err(|_| EngineError::InvalidDuration {
            requested: total_secs,
        })?;
        self.session = Some(SessionState {
            mode,
            total_secs: total,
            remaining_secs: total,
            running: true,
            task: task.into(),
        });
        if total == 0 {
            return Ok(Some(self.complete(false)));
        }
        Ok(None)
    }

    /// Returns `true` if the session was running.
    pub fn pause(&mut self) -> bool {
        match &mut self.session {
            Some(s) if s.running => {
                s.running = false;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if a paused session started running.
    pub fn resume(&mut self) -> bool {
        match &mut self.session {
            Some(s) if !s.running => {
                s.running = true;
                true
            }
            _ => false,
        }
    }

    /// Rewind to the full duration, held. Returns `false` when idle.
    pub fn reset(&mut self) -> bool {
        match &mut self.session {
            Some(s) => {
                s.remaining_secs = s.total_secs;
                s.running = false;
                true
            }
            None => false,
        }
    }

    /// Force completion of the current session. `None` when idle.
    pub fn skip(&mut self) -> Option<Completion> {
        self.session.as_ref()?;
        Some(self.complete(true))
    }

    /// Discard the session. Returns `false` when already idle.
    pub fn stop(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Consume one second of a running session.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut().filter(|s| s.running) else {
            return TickOutcome::Ignored;
        };
        session.remaining_secs = session.remaining_secs.saturating_sub(1);
        if session.remaining_secs == 0 {
            TickOutcome::Completed(self.complete(false))
        } else {
            TickOutcome::Counted
        }
    }

    pub fn clear_completed(&mut self) {
        self.completed_focus = 0;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, skipped: bool) -> Completion {
        let (completed, task) = match self.session.take() {
            Some(s) => (s.mode, s.task),
            None => (Mode::Focus, String::new()),
        };
        if completed.counts_toward_rotation() {
            self.completed_focus = self.completed_focus.saturating_add(1);
        }
        let next = next_mode(completed, self.completed_focus);
        self.session = Some(SessionState::ready(next, task));
        Completion {
            completed,
            next,
            completed_focus_count: self.completed_focus,
            skipped,
        }
    }
}

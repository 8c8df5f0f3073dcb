use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Completion, Mode, Snapshot};

/// Everything the engine publishes on its state channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Current state after a tick or an operation.
    StateSnapshot(Snapshot),
    /// A session reached zero, naturally or through skip.
    /// Always followed by a snapshot of the next mode.
    Completed {
        mode: Mode,
        next_mode: Mode,
        completed_focus_count: u32,
        skipped: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn completed(completion: &Completion) -> Self {
        Event::Completed {
            mode: completion.completed,
            next_mode: completion.next,
            completed_focus_count: completion.completed_focus_count,
            skipped: completion.skipped,
            at: Utc::now(),
        }
    }

    pub fn as_snapshot(&self) -> Option<&Snapshot> {
        match self {
            Event::StateSnapshot(snapshot) => Some(snapshot),
            Event::Completed { .. } => None,
        }
    }
}

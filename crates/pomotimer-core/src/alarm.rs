//! Alarm collaborator.
//!
//! The engine only says "this mode just finished"; playing audio, vibrating
//! or flashing the screen is the host's business.

use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Invoked exactly once per completed session (natural or skipped), never
/// for pause, stop or reset.
pub trait AlarmTrigger: Send + Sync {
    fn fire(&self, mode: Mode);
}

impl<F> AlarmTrigger for F
where
    F: Fn(Mode) + Send + Sync,
{
    fn fire(&self, mode: Mode) {
        self(mode)
    }
}

/// Alarm that does nothing. For hosts that only watch the state channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlarm;

impl AlarmTrigger for SilentAlarm {
    fn fire(&self, mode: Mode) {
        tracing::debug!(%mode, "alarm suppressed");
    }
}

/// What an alarm screen shows for a finished mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmNotice {
    pub mode: Mode,
    pub headline: String,
    pub text: String,
    /// Snooze is only offered after focus sessions.
    pub snooze_offered: bool,
}

impl AlarmNotice {
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            headline: mode.alarm_headline().to_string(),
            text: format!("{} complete", mode.session_label()),
            snooze_offered: mode == Mode::Focus,
        }
    }
}

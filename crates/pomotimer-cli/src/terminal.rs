//! Terminal renderings of the alarm and the ongoing notification.
//!
//! Everything goes to stderr so `run --json` keeps stdout machine-readable.

use std::io::Write;

use pomotimer_core::{
    AlarmNotice, AlarmSoundConfig, AlarmTrigger, Mode, NotificationPresenter, OngoingNotification,
};

/// Rings the terminal bell and prints the alarm headline.
pub struct TerminalAlarm {
    sound: AlarmSoundConfig,
    quiet: bool,
}

impl TerminalAlarm {
    pub fn new(sound: AlarmSoundConfig, quiet: bool) -> Self {
        Self { sound, quiet }
    }
}

impl AlarmTrigger for TerminalAlarm {
    fn fire(&self, mode: Mode) {
        tracing::info!(%mode, sound = %self.sound.name, "alarm");
        if self.quiet {
            return;
        }
        let notice = AlarmNotice::for_mode(mode);
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "\x07\n{}  {}", notice.headline, notice.text);
        let _ = err.flush();
    }
}

/// Redraws a single status line in place.
pub struct TerminalPresenter;

impl NotificationPresenter for TerminalPresenter {
    fn present(&self, notification: &OngoingNotification) {
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\r\x1b[2K{}  {}  [p] {}  [q] {}",
            notification.title,
            notification.text,
            notification.primary_action,
            notification.secondary_action
        );
        let _ = err.flush();
    }

    fn dismiss(&self) {
        let _ = writeln!(std::io::stderr().lock(), "\r\x1b[2K");
    }

    fn alarm(&self, notice: &AlarmNotice) {
        let hint = if notice.snooze_offered {
            "[z] snooze  [c] start break"
        } else {
            "[c] continue"
        };
        let _ = writeln!(std::io::stderr().lock(), "{hint}");
    }
}

//! Rotation policy: which mode follows a completed session.

use super::mode::Mode;

/// Every Nth completed focus session earns a long break.
pub const LONG_BREAK_EVERY: u32 = 4;

/// Next mode after `completed` finishes.
///
/// `completed_focus_count` must already include the session that just
/// finished, so the 4th, 8th, ... focus completion yields a long break.
pub fn next_mode(completed: Mode, completed_focus_count: u32) -> Mode {
    match completed {
        Mode::Focus => {
            if completed_focus_count > 0 && completed_focus_count % LONG_BREAK_EVERY == 0 {
                Mode::LongBreak
            } else {
                Mode::ShortBreak
            }
        }
        Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
    }
}

/// How many of the current rotation's focus slots are filled.
pub fn rotation_position(completed_focus_count: u32) -> u32 {
    completed_focus_count % LONG_BREAK_EVERY
}

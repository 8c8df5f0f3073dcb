use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Countdown category. The table of per-mode properties is fixed at
/// compile time; durations are not user-configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Label shown while a session of this mode is ticking.
    pub fn session_label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus Session",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn nominal_minutes(self) -> u32 {
        match self {
            Mode::Focus => 25,
            Mode::ShortBreak => 5,
            Mode::LongBreak => 15,
        }
    }

    pub fn nominal_secs(self) -> u64 {
        u64::from(self.nominal_minutes()) * 60
    }

    /// Accent color token (`#RRGGBB`).
    pub fn accent(self) -> &'static str {
        match self {
            Mode::Focus => "#F5A623",
            Mode::ShortBreak => "#5ECF7A",
            Mode::LongBreak => "#5EC4CF",
        }
    }

    pub fn glow_alpha(self) -> u8 {
        18
    }

    /// Only focus sessions advance the rotation counter.
    pub fn counts_toward_rotation(self) -> bool {
        matches!(self, Mode::Focus)
    }

    pub fn is_break(self) -> bool {
        !self.counts_toward_rotation()
    }

    pub fn alarm_headline(self) -> &'static str {
        match self {
            Mode::Focus => "TIME'S UP",
            Mode::ShortBreak => "BREAK OVER",
            Mode::LongBreak => "BREAK DONE",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortBreak => "short_break",
            Mode::LongBreak => "long_break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "focus" => Ok(Mode::Focus),
            "short_break" | "short" => Ok(Mode::ShortBreak),
            "long_break" | "long" => Ok(Mode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected focus, short_break or long_break)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_durations() {
        assert_eq!(Mode::Focus.nominal_secs(), 1500);
        assert_eq!(Mode::ShortBreak.nominal_secs(), 300);
        assert_eq!(Mode::LongBreak.nominal_secs(), 900);
    }

    #[test]
    fn default_is_focus() {
        assert_eq!(Mode::default(), Mode::Focus);
    }

    #[test]
    fn only_focus_counts() {
        assert!(Mode::Focus.counts_toward_rotation());
        assert!(!Mode::ShortBreak.counts_toward_rotation());
        assert!(!Mode::LongBreak.counts_toward_rotation());
    }

    #[test]
    fn parse_accepts_names_and_aliases() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!("Short-Break".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!("long".parse::<Mode>().unwrap(), Mode::LongBreak);
        assert!("nap".parse::<Mode>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Mode::ShortBreak).unwrap();
        assert_eq!(json, "\"short_break\"");
    }
}

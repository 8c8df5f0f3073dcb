mod config;
pub mod database;
mod memory;
mod writer;

pub use config::{Config, LogConfig, NotificationsConfig, TimerConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;
pub use writer::PersistenceWriter;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const DEFAULT_ALARM_NAME: &str = "Default Tone";

/// Alarm sound chosen by the user. Opaque to the engine; only the host's
/// alarm presenter interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSoundConfig {
    /// Sound location (URI or file path). `None` means the system default.
    pub uri: Option<String>,
    pub name: String,
}

impl Default for AlarmSoundConfig {
    fn default() -> Self {
        Self {
            uri: None,
            name: DEFAULT_ALARM_NAME.to_string(),
        }
    }
}

/// Key-value persistence the engine writes through.
///
/// Reads return the last successfully written value, or the documented
/// default when nothing was written yet (count `0`, empty task, default
/// alarm sound).
pub trait PersistenceStore: Send + Sync {
    fn completed_count(&self) -> Result<u32, StoreError>;
    fn set_completed_count(&self, count: u32) -> Result<(), StoreError>;

    fn last_task(&self) -> Result<String, StoreError>;
    fn set_last_task(&self, task: &str) -> Result<(), StoreError>;

    fn alarm_sound(&self) -> Result<AlarmSoundConfig, StoreError>;
    fn set_alarm_sound(&self, sound: &AlarmSoundConfig) -> Result<(), StoreError>;

    fn clear_completed(&self) -> Result<(), StoreError> {
        self.set_completed_count(0)
    }
}

/// Returns `~/.config/pomotimer[-dev]/` based on POMOTIMER_ENV.
///
/// Set POMOTIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomotimer-dev")
    } else {
        base_dir.join("pomotimer")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

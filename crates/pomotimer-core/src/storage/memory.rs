use std::sync::{Mutex, MutexGuard};

use super::{AlarmSoundConfig, PersistenceStore};
use crate::error::StoreError;

#[derive(Debug, Default, Clone)]
struct Values {
    completed: u32,
    task: String,
    alarm: AlarmSoundConfig,
}

/// In-process store. Nothing survives the process; used by tests and by
/// embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Values>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a completed-session count and last task.
    pub fn with_values(completed: u32, task: impl Into<String>) -> Self {
        Self {
            values: Mutex::new(Values {
                completed,
                task: task.into(),
                alarm: AlarmSoundConfig::default(),
            }),
        }
    }

    fn values(&self) -> Result<MutexGuard<'_, Values>, StoreError> {
        self.values.lock().map_err(|_| StoreError::Unavailable)
    }
}

impl PersistenceStore for MemoryStore {
    fn completed_count(&self) -> Result<u32, StoreError> {
        Ok(self.values()?.completed)
    }

    fn set_completed_count(&self, count: u32) -> Result<(), StoreError> {
        self.values()?.completed = count;
        Ok(())
    }

    fn last_task(&self) -> Result<String, StoreError> {
        Ok(self.values()?.task.clone())
    }

    fn set_last_task(&self, task: &str) -> Result<(), StoreError> {
        self.values()?.task = task.to_string();
        Ok(())
    }

    fn alarm_sound(&self) -> Result<AlarmSoundConfig, StoreError> {
        Ok(self.values()?.alarm.clone())
    }

    fn set_alarm_sound(&self, sound: &AlarmSoundConfig) -> Result<(), StoreError> {
        self.values()?.alarm = sound.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.completed_count().unwrap(), 0);
        assert_eq!(store.last_task().unwrap(), "");
        assert_eq!(store.alarm_sound().unwrap().name, "Default Tone");
    }

    #[test]
    fn clear_resets_count_only() {
        let store = MemoryStore::with_values(7, "essay");
        store.clear_completed().unwrap();
        assert_eq!(store.completed_count().unwrap(), 0);
        assert_eq!(store.last_task().unwrap(), "essay");
    }
}

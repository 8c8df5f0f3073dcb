use pomotimer_core::error::Result;
use pomotimer_core::timer::{next_mode, rotation_position};
use pomotimer_core::{AlarmSoundConfig, Mode, PersistenceStore, SqliteStore};
use serde::Serialize;

#[derive(Serialize)]
struct Status {
    completed_count: u32,
    /// Filled slots of the current four-session rotation.
    rotation_position: u32,
    /// Break earned by the next completed focus session.
    next_break: Mode,
    last_task: String,
    alarm_sound: AlarmSoundConfig,
}

pub fn run() -> Result<()> {
    let store = SqliteStore::open()?;
    let completed_count = store.completed_count()?;

    let status = Status {
        completed_count,
        rotation_position: rotation_position(completed_count),
        next_break: next_mode(Mode::Focus, completed_count.saturating_add(1)),
        last_task: store.last_task()?,
        alarm_sound: store.alarm_sound()?,
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

//! SQLite-backed persistence store.
//!
//! A single key-value table holds:
//! - `sessions`: completed focus session count
//! - `task`: last task label
//! - `alarm_uri` / `alarm_name`: alarm sound selection

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

use super::{data_dir, AlarmSoundConfig, PersistenceStore, DEFAULT_ALARM_NAME};
use crate::error::StoreError;

const KEY_SESSIONS: &str = "sessions";
const KEY_TASK: &str = "task";
const KEY_ALARM_URI: &str = "alarm_uri";
const KEY_ALARM_NAME: &str = "alarm_name";

/// SQLite database for engine persistence.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at `~/.config/pomotimer/pomotimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Self::open_at(dir.join("pomotimer.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Unavailable)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
}

impl PersistenceStore for SqliteStore {
    fn completed_count(&self) -> Result<u32, StoreError> {
        match self.kv_get(KEY_SESSIONS)? {
            Some(raw) => raw.trim().parse().map_err(|_| StoreError::Corrupt {
                key: KEY_SESSIONS.to_string(),
                value: raw,
            }),
            None => Ok(0),
        }
    }

    fn set_completed_count(&self, count: u32) -> Result<(), StoreError> {
        self.kv_set(KEY_SESSIONS, &count.to_string())
    }

    fn last_task(&self) -> Result<String, StoreError> {
        Ok(self.kv_get(KEY_TASK)?.unwrap_or_default())
    }

    fn set_last_task(&self, task: &str) -> Result<(), StoreError> {
        self.kv_set(KEY_TASK, task)
    }

    fn alarm_sound(&self) -> Result<AlarmSoundConfig, StoreError> {
        Ok(AlarmSoundConfig {
            uri: self.kv_get(KEY_ALARM_URI)?,
            name: self
                .kv_get(KEY_ALARM_NAME)?
                .unwrap_or_else(|| DEFAULT_ALARM_NAME.to_string()),
        })
    }

    fn set_alarm_sound(&self, sound: &AlarmSoundConfig) -> Result<(), StoreError> {
        match &sound.uri {
            Some(uri) => self.kv_set(KEY_ALARM_URI, uri)?,
            None => self.kv_delete(KEY_ALARM_URI)?,
        }
        self.kv_set(KEY_ALARM_NAME, &sound.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = SqliteStore::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn defaults_when_empty() {
        let db = SqliteStore::open_memory().unwrap();
        assert_eq!(db.completed_count().unwrap(), 0);
        assert_eq!(db.last_task().unwrap(), "");
        assert_eq!(db.alarm_sound().unwrap(), AlarmSoundConfig::default());
    }

    #[test]
    fn count_and_task_roundtrip() {
        let db = SqliteStore::open_memory().unwrap();
        db.set_completed_count(9).unwrap();
        db.set_last_task("draft chapter").unwrap();
        assert_eq!(db.completed_count().unwrap(), 9);
        assert_eq!(db.last_task().unwrap(), "draft chapter");

        db.clear_completed().unwrap();
        assert_eq!(db.completed_count().unwrap(), 0);
    }

    #[test]
    fn corrupt_count_is_reported() {
        let db = SqliteStore::open_memory().unwrap();
        db.kv_set(KEY_SESSIONS, "many").unwrap();
        assert!(matches!(
            db.completed_count(),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn clearing_alarm_uri_falls_back_to_default_sound() {
        let db = SqliteStore::open_memory().unwrap();
        db.set_alarm_sound(&AlarmSoundConfig {
            uri: Some("file:///tmp/bell.ogg".into()),
            name: "Bell".into(),
        })
        .unwrap();
        assert_eq!(db.alarm_sound().unwrap().uri.as_deref(), Some("file:///tmp/bell.ogg"));

        db.set_alarm_sound(&AlarmSoundConfig {
            uri: None,
            name: "Chime".into(),
        })
        .unwrap();
        let sound = db.alarm_sound().unwrap();
        assert!(sound.uri.is_none());
        assert_eq!(sound.name, "Chime");
    }
}

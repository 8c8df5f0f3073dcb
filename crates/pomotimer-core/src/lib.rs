//! # pomotimer Core Library
//!
//! The session engine behind the pomotimer focus timer. It alternates focus
//! and break intervals, owns the authoritative countdown, and publishes its
//! state to any number of observers. Hosts (the CLI, a tray app, a phone
//! shell) are thin adapters: they forward user intents and render snapshots.
//!
//! ## Architecture
//!
//! - **Session machine**: pure state machine over one [`SessionState`] plus
//!   the focus completion counter
//! - **Rotation policy**: every 4th completed focus session earns a long break
//! - **Ticker**: once-per-second tick task aligned to fixed deadlines
//! - **Engine**: ticker + machine behind one lock, publishing on a
//!   [`StateChannel`]
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: public start/pause/resume/stop/skip/reset surface
//! - [`StateChannel`]: broadcast of [`Event`]s with resync-on-attach
//! - [`PersistenceStore`]: counter, last task and alarm sound persistence
//! - [`AlarmTrigger`] / [`NotificationPresenter`]: host collaborators

pub mod alarm;
pub mod channel;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use alarm::{AlarmNotice, AlarmTrigger, SilentAlarm};
pub use channel::{StateChannel, Subscription};
pub use error::{ConfigError, CoreError, EngineError, StoreError};
pub use events::Event;
pub use notify::{spawn_presenter, NotificationAction, NotificationPresenter, OngoingNotification};
pub use storage::{
    AlarmSoundConfig, Config, MemoryStore, PersistenceStore, PersistenceWriter, SqliteStore,
};
pub use timer::{
    EngineOptions, Mode, SessionMachine, SessionState, Snapshot, TimerEngine, TimerState,
};

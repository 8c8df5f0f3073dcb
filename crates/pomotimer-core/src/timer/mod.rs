mod engine;
mod mode;
pub mod policy;
mod session;
mod ticker;

pub use engine::{EngineOptions, TimerEngine};
pub use mode::Mode;
pub use policy::{next_mode, rotation_position, LONG_BREAK_EVERY};
pub use session::{
    format_clock, Completion, SessionMachine, SessionState, Snapshot, TickOutcome, TimerState,
};
pub use ticker::{Ticker, TICK_PERIOD};

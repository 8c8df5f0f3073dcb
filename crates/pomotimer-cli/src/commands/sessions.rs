use clap::Subcommand;
use pomotimer_core::error::Result;
use pomotimer_core::{PersistenceStore, SqliteStore};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// Print the completed focus session count
    Count,
    /// Reset the completed focus session count to zero
    Reset,
}

pub fn run(action: SessionsAction) -> Result<()> {
    let store = SqliteStore::open()?;

    match action {
        SessionsAction::Count => {
            println!("{}", store.completed_count()?);
        }
        SessionsAction::Reset => {
            store.clear_completed()?;
            println!("completed sessions reset");
        }
    }
    Ok(())
}

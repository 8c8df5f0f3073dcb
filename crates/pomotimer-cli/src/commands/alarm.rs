use clap::Subcommand;
use pomotimer_core::error::Result;
use pomotimer_core::{AlarmSoundConfig, PersistenceStore, SqliteStore};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Print the selected alarm sound as JSON
    Show,
    /// Select an alarm sound
    Set {
        /// Display name
        #[arg(long)]
        name: String,
        /// Sound file path or URI; omit for the system default
        #[arg(long)]
        uri: Option<String>,
    },
}

pub fn run(action: AlarmAction) -> Result<()> {
    let store = SqliteStore::open()?;

    match action {
        AlarmAction::Show => {
            let sound = store.alarm_sound()?;
            println!("{}", serde_json::to_string_pretty(&sound)?);
        }
        AlarmAction::Set { name, uri } => {
            store.set_alarm_sound(&AlarmSoundConfig { uri, name })?;
            println!("ok");
        }
    }
    Ok(())
}

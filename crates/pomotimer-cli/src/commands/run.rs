use std::sync::Arc;

use clap::Args;
use pomotimer_core::error::Result;
use pomotimer_core::{
    spawn_presenter, Config, EngineOptions, Mode, PersistenceStore, SqliteStore, TimerEngine,
    TimerState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::terminal::{TerminalAlarm, TerminalPresenter};

#[derive(Args)]
pub struct RunArgs {
    /// Session mode (focus, short_break, long_break)
    #[arg(long, default_value = "focus")]
    mode: Mode,
    /// Session length in seconds (defaults to the mode's nominal length)
    #[arg(long, conflicts_with = "minutes", allow_hyphen_values = true)]
    seconds: Option<i64>,
    /// Session length in minutes
    #[arg(long, allow_hyphen_values = true)]
    minutes: Option<i64>,
    /// Task label (defaults to the last task used)
    #[arg(long)]
    task: Option<String>,
    /// Print every engine event as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn total_secs(&self) -> i64 {
        match (self.seconds, self.minutes) {
            (Some(secs), _) => secs,
            (None, Some(mins)) => mins.saturating_mul(60),
            (None, None) => i64::try_from(self.mode.nominal_secs()).unwrap_or(i64::MAX),
        }
    }
}

/// One line of stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostCommand {
    Toggle,
    Skip,
    Reset,
    Snooze,
    Continue,
    Quit,
}

impl HostCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "pause" => Some(Self::Toggle),
            "s" | "skip" => Some(Self::Skip),
            "r" | "reset" => Some(Self::Reset),
            "z" | "snooze" => Some(Self::Snooze),
            "c" | "continue" => Some(Self::Continue),
            "q" | "quit" | "stop" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub fn run(args: RunArgs, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(host(args, config))
}

async fn host(args: RunArgs, config: &Config) -> Result<()> {
    let store: Arc<dyn PersistenceStore> = Arc::new(SqliteStore::open()?);
    let sound = store.alarm_sound().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read alarm sound");
        Default::default()
    });
    let alarm = Arc::new(TerminalAlarm::new(sound, args.json));
    let engine = TimerEngine::new(store, alarm, EngineOptions::from(config))?;

    let observer = if args.json {
        Some(spawn_json_printer(&engine))
    } else if config.notifications.enabled {
        Some(spawn_presenter(
            &engine,
            Arc::new(TerminalPresenter),
            config.notifications.show_task,
        ))
    } else {
        None
    };

    let task = args.task.clone().unwrap_or_else(|| engine.last_task());
    let started = engine.start(args.mode, args.total_secs(), &task);
    if let Err(e) = started {
        engine.shutdown().await;
        return Err(e.into());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match HostCommand::parse(&line) {
                    Some(HostCommand::Quit) => break,
                    Some(command) => apply(&engine, command),
                    None if line.trim().is_empty() => {}
                    None => tracing::warn!(input = %line.trim(), "unknown command"),
                },
                None => {
                    tokio::select! {
                        _ = settle(&engine) => {}
                        _ = tokio::signal::ctrl_c() => {}
                    }
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    engine.shutdown().await;
    drop(engine);
    if let Some(observer) = observer {
        let _ = observer.await;
    }
    Ok(())
}

fn apply(engine: &TimerEngine, command: HostCommand) {
    let snapshot = match command {
        HostCommand::Toggle => engine.toggle(),
        HostCommand::Skip => engine.skip(),
        HostCommand::Reset => engine.reset(),
        HostCommand::Snooze => engine.snooze(),
        HostCommand::Continue => engine.resume(),
        HostCommand::Quit => engine.stop(),
    };
    tracing::debug!(?command, state = ?snapshot.state, "applied");
}

/// Resolves once no countdown is running, so a closed stdin still lets the
/// current session finish.
async fn settle(engine: &TimerEngine) {
    let mut sub = engine.subscribe();
    while engine.state() == TimerState::Running {
        if sub.recv().await.is_none() {
            break;
        }
    }
}

fn spawn_json_printer(engine: &TimerEngine) -> JoinHandle<()> {
    let mut sub = engine.subscribe();
    tokio::spawn(async move {
        while let Some(event) = sub.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "could not encode event"),
            }
        }
    })
}

use clap::{Parser, Subcommand};
use pomotimer_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "pomotimer", version, about = "Focus timer with automatic break rotation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session and keep it ticking in the foreground
    Run(commands::run::RunArgs),
    /// Print persisted rotation state as JSON
    Status,
    /// Completed-session counter management
    Sessions {
        #[command(subcommand)]
        action: commands::sessions::SessionsAction,
    },
    /// Alarm sound selection
    Alarm {
        #[command(subcommand)]
        action: commands::alarm::AlarmAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("POMOTIMER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, &config),
        Commands::Status => commands::status::run(),
        Commands::Sessions { action } => commands::sessions::run(action),
        Commands::Alarm { action } => commands::alarm::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

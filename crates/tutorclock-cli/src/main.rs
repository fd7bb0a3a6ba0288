use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tutorclock_core::Config;

mod commands;
mod output;
mod shell;

#[derive(Parser)]
#[command(name = "tutorclock", version, about = "Time spent with each student, one at a time")]
struct Cli {
    /// Roster snapshot file (overrides storage.roster_file)
    #[arg(long, global = true)]
    roster_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: read commands from stdin, print events
    Run(commands::run::RunArgs),
    /// Inspect or edit the saved roster
    Roster {
        #[command(subcommand)]
        action: commands::roster::RosterAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run(args) => {
            let config = Config::load()?;
            let store = commands::open_store(cli.roster_file, &config)?;
            commands::run::run(args, store, config)
        }
        Commands::Roster { action } => {
            let config = Config::load()?;
            let store = commands::open_store(cli.roster_file, &config)?;
            commands::roster::run(action, &store, &config)
        }
        Commands::Config { action } => commands::config::run(action),
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

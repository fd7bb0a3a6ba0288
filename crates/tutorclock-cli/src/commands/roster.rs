use clap::Subcommand;
use tutorclock_core::{Config, JsonFileStore, Session, SnapshotStore};

use crate::output::render_roster;

#[derive(Subcommand)]
pub enum RosterAction {
    /// List entries with their accrued time
    List {
        /// Print the stored snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an entry without starting a session
    Add {
        name: String,
        /// Course tag (defaults to course.default)
        #[arg(long)]
        course: Option<String>,
    },
    /// Remove an entry
    Remove { name: String },
}

/// Load, apply one change, save. Timers never run here.
pub fn run(
    action: RosterAction,
    store: &JsonFileStore,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session =
        Session::new(config.tick_period()).with_course(config.course.default.clone());
    session.load(store.load()?);

    match action {
        RosterAction::List { json } => {
            let snapshot = session.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", render_roster(&snapshot));
            }
        }
        RosterAction::Add { name, course } => {
            session.add_entity(&name, course)?;
            store.save(&session.snapshot())?;
            println!("added '{}'", name.trim());
        }
        RosterAction::Remove { name } => match session.remove_entity(&name) {
            Some(_) => {
                store.save(&session.snapshot())?;
                println!("removed '{}'", name.trim());
            }
            None => println!("'{}' is not on the roster", name.trim()),
        },
    }
    Ok(())
}

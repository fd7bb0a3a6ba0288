use clap::Subcommand;
use tutorclock_core::{Config, ConfigError};

/// Keys accepted by `config get` and `config set`.
pub const KEYS: &[&str] = &[
    "timer.tick_ms",
    "storage.roster_file",
    "storage.save_on_exit",
    "course.default",
];

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, e.g. `config get course.default`
    Get {
        /// timer.tick_ms | storage.roster_file | storage.save_on_exit | course.default
        key: String,
    },
    /// Change one setting and write config.toml
    Set {
        /// timer.tick_ms | storage.roster_file | storage.save_on_exit | course.default
        key: String,
        /// Milliseconds, a path, true/false or a course tag; "" clears a path or course
        value: String,
    },
    /// Dump every setting as JSON
    List,
    /// Overwrite config.toml with defaults (1s ticks, roster.json in the data dir)
    Reset,
    /// Where config.toml lives
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| unknown_key(&key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value).map_err(|e| match e {
                ConfigError::UnknownKey(key) => unknown_key(&key),
                other => other.into(),
            })?;
            println!("{key} = {}", config.get(&key).unwrap_or_default());
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset: tick every 1000 ms, no default course, no save on exit");
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
        }
    }
    Ok(())
}

fn unknown_key(key: &str) -> Box<dyn std::error::Error> {
    format!("unknown config key '{key}' (expected one of: {})", KEYS.join(", ")).into()
}

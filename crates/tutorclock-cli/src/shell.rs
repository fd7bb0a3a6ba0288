//! Line commands read by `tutorclock run`.

use clap::{CommandFactory, Parser, Subcommand};
use tutorclock_core::Command;

#[derive(Parser)]
#[command(
    name = "session",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Line {
    #[command(subcommand)]
    command: LineCommand,
}

#[derive(Subcommand)]
enum LineCommand {
    /// Show the course context, or set it for new entries
    Course {
        course: Option<String>,
        /// Clear the course context
        #[arg(long, conflicts_with = "course")]
        clear: bool,
    },
    /// Add a name to the roster
    Add {
        name: String,
        /// Course tag (defaults to the course context)
        #[arg(long, short)]
        course: Option<String>,
    },
    /// Remove a name from the roster
    #[command(alias = "rm")]
    Remove { name: String },
    /// Start or stop the timer for a name
    #[command(alias = "t")]
    Toggle { name: String },
    /// Show the roster
    #[command(alias = "ls")]
    List,
    /// Write the roster to disk now
    Save,
    /// Show this help
    Help,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// What the interactive loop should do with one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineAction {
    Send(Command),
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<LineAction>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let args = split_line(trimmed)?;
    let parsed = Line::try_parse_from(args).map_err(|e| e.render().to_string())?;

    let action = match parsed.command {
        LineCommand::Course { clear: true, .. } => {
            LineAction::Send(Command::SetCurrentCourse { course: None })
        }
        LineCommand::Course { course: Some(course), .. } => {
            LineAction::Send(Command::SetCurrentCourse {
                course: Some(course),
            })
        }
        LineCommand::Course { course: None, .. } => LineAction::Send(Command::GetCurrentCourse),
        LineCommand::Add { name, course } => LineAction::Send(Command::AddEntity { name, course }),
        LineCommand::Remove { name } => LineAction::Send(Command::RemoveEntity { name }),
        LineCommand::Toggle { name } => LineAction::Send(Command::ToggleTimer { name }),
        LineCommand::List => LineAction::Send(Command::RequestReload),
        LineCommand::Save => LineAction::Send(Command::PersistNow),
        LineCommand::Help => LineAction::Help,
        LineCommand::Quit => LineAction::Quit,
    };
    Ok(Some(action))
}

pub fn help_text() -> String {
    Line::command().render_help().to_string()
}

/// Split on whitespace, keeping single- or double-quoted runs together.
fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

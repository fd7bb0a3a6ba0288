use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tutorclock_core::{runtime, Config, JsonFileStore, Session, SnapshotStore};

use crate::output::{render_event, OutputMode};
use crate::shell::{help_text, parse_line, LineAction};

#[derive(Args)]
pub struct RunArgs {
    /// Print every event as a JSON line, including per-second ticks
    #[arg(long)]
    pub json: bool,
    /// Milliseconds per credited second (overrides timer.tick_ms)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: Option<u64>,
    /// Save the roster on quit (also enabled by storage.save_on_exit)
    #[arg(long)]
    pub save_on_exit: bool,
}

pub fn run(
    args: RunArgs,
    store: JsonFileStore,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(interactive(args, store, config));
    // A pending stdin read would otherwise hold the runtime open.
    rt.shutdown_background();
    result
}

async fn interactive(
    args: RunArgs,
    store: JsonFileStore,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let period = args
        .tick_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.tick_period());
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let save_on_exit = args.save_on_exit || config.storage.save_on_exit;

    info!(roster = %store.location(), period_ms = period.as_millis() as u64, "starting session");
    let session = Session::new(period).with_course(config.course.default.clone());
    let (handle, mut events) = runtime::spawn(session, Arc::new(store));

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = render_event(&event, mode) {
                println!("{line}");
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(LineAction::Send(command))) => handle.send(command)?,
            Ok(Some(LineAction::Help)) => println!("{}", help_text()),
            Ok(Some(LineAction::Quit)) => break,
            Err(message) => eprintln!("{}", message.trim_end()),
        }
    }

    handle.shutdown(save_on_exit).await?;
    printer.await?;
    Ok(())
}

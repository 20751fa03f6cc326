//! Command-line front end.
//!
//! # Responsibility
//! - Run one tracker action per invocation against a local SQLite file.
//! - Print the re-rendered markup to stdout.

use clap::{Parser, Subcommand};
use hibi_core::{
    init_logging, AppConfig, Controller, EntryFields, EntryFlag, EntryId, Filter, InsertPosition,
    Outcome, SortOrder, SqliteKv, SystemClock, UuidIds,
};
use log::info;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "hibi", version, about = "Local habit and mood tracker")]
struct Cli {
    /// SQLite file holding every app's records.
    #[arg(long, default_value = "hibi.sqlite3")]
    db: PathBuf,

    /// App name; records live under `<app>_v<schema>`.
    #[arg(long, default_value = "todo")]
    app: String,

    #[arg(long, default_value_t = 1)]
    schema: u32,

    /// Insert new entries at the top instead of the bottom.
    #[arg(long)]
    prepend: bool,

    /// Show newest entries first.
    #[arg(long)]
    newest_first: bool,

    /// Absolute directory for rotating log files. Logging is off without it.
    #[arg(long)]
    log_dir: Option<String>,

    #[arg(long, default_value_t = hibi_core::default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add one entry.
    Add {
        text: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Replace the text of an entry.
    Edit { id: String, text: String },
    /// Flip the done flag, or the pinned flag with `--pinned`.
    Toggle {
        id: String,
        #[arg(long)]
        pinned: bool,
    },
    /// Delete one entry.
    Rm { id: String },
    /// Delete every entry of the app.
    Clear,
    /// Render the list, optionally switching the remembered filter.
    List {
        /// all | active | done | category:NAME
        #[arg(long)]
        filter: Option<Filter>,
    },
    /// Run a countdown and record it as an entry when it completes.
    Timer {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        seconds: u64,
        #[arg(long, default_value = "タイマー")]
        label: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hibi: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir)?;
    }

    let config = app_config(&cli);
    let kv = SqliteKv::open(&cli.db)?;

    let mut controller = Controller::start(config, kv, UuidIds, SystemClock)?;
    execute(&mut controller, cli.command, &mut io::stdout().lock())
}

fn app_config(cli: &Cli) -> AppConfig {
    AppConfig {
        app_name: cli.app.clone(),
        schema_version: cli.schema,
        insert_position: if cli.prepend {
            InsertPosition::Prepend
        } else {
            InsertPosition::Append
        },
        sort_order: if cli.newest_first {
            SortOrder::NewestFirst
        } else {
            SortOrder::Insertion
        },
        ..AppConfig::default()
    }
}

/// Runs one command and writes the resulting view to `out`.
///
/// A rejected input still writes the view (with its cue) before failing.
fn execute(
    controller: &mut Controller<SqliteKv, UuidIds, SystemClock>,
    command: Command,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let stale = controller.persistence().stale_keys();
    if !stale.is_empty() {
        let names: Vec<String> = stale.iter().map(ToString::to_string).collect();
        eprintln!("hibi: ignoring records from older versions: {}", names.join(", "));
    }

    let outcome = match command {
        Command::Add { text, category } => controller.submit(EntryFields {
            text,
            category,
            ..EntryFields::default()
        }),
        Command::Edit { id, text } => controller.edit_text(&EntryId::new(id), &text),
        Command::Toggle { id, pinned } => {
            let flag = if pinned {
                EntryFlag::Pinned
            } else {
                EntryFlag::Done
            };
            controller.toggle(&EntryId::new(id), flag)
        }
        Command::Rm { id } => controller.remove(&EntryId::new(id)),
        Command::Clear => controller.clear(),
        Command::List { filter } => {
            if let Some(filter) = filter {
                controller.set_filter(filter);
            }
            Outcome::Applied
        }
        Command::Timer { seconds, label } => {
            let target_ms = i64::try_from(seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
            controller.start_timer(&label, Some(target_ms))?;
            info!("event=cli_timer module=cli status=start target_ms={target_ms}");
            while controller.tick().is_none() {
                thread::sleep(POLL_INTERVAL);
            }
            controller.acknowledge_timer()?;
            Outcome::Applied
        }
    };

    write!(out, "{}", controller.view())?;
    out.flush()?;
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Rejected(err) => Err(err.into()),
    }
}

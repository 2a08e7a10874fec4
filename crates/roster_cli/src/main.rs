//! `roster` CLI entry point.
//!
//! # Responsibility
//! - Parse startup flags, initialize optional file logging and open the
//!   roster database.
//! - Hand one explicitly owned connection to the interactive menu.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use roster_core::db::open_db;
use roster_core::{
    default_log_level, init_logging, RosterService, RosterServiceError, SqliteRosterRepository,
};
use std::io;
use std::path::PathBuf;

mod menu;

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Record students, classes and teachers and who belongs to which class"
)]
struct Cli {
    /// SQLite database file; created with the full schema when missing
    #[arg(long, default_value = "roster.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (defaults to debug in debug builds, info otherwise)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open roster database {}", cli.db.display()))?;
    // Surface the same guidance the menu prints if the schema is gone.
    let repo = SqliteRosterRepository::try_new(&conn)
        .map_err(RosterServiceError::from)
        .context("roster schema is not ready")?;
    let service = RosterService::new(repo);

    info!(
        "event=cli_start module=cli status=ok db={}",
        cli.db.display()
    );

    let stdin = io::stdin();
    menu::Menu::new(&service, stdin.lock(), io::stdout())
        .run()
        .context("console I/O failed")?;

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

//! # MID News
//!
//! Scrapes the announcement list of a news page, stores every newly published
//! item once, snapshots each article page to disk, and keeps browsable HTML
//! indexes of the snapshots per day and across days.
//!
//! ## Usage
//!
//! ```sh
//! mid_news --config config.yaml run
//! ```
//!
//! ## Architecture
//!
//! The `run` command is a sequential pipeline:
//! 1. **Extraction**: parse the announcement list into candidates
//! 2. **Dedup**: keep candidates whose publication timestamp is not stored yet
//! 3. **Fetching**: capture each new article page, oldest first, with a random delay
//! 4. **Output**: numbered snapshots + day `index.html`, then the global index
//!
//! Scheduling is external: `schedule` prints crontab lines that invoke `run`.
//! A lock file in the base directory keeps runs from overlapping.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod lock;
mod models;
mod outputs;
mod pipeline;
mod renderer;
mod store;
mod utils;

use cli::{Cli, Command};
use config::Settings;
use renderer::http::HttpRenderer;
use store::{NewsStore, SqliteStore};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(&args.config)?;
    if let Some(base_dir) = args.base_dir {
        settings.base_dir = base_dir;
    }
    if let Some(database) = args.database {
        settings.database = database;
    }
    if let Some(main_page) = args.main_page {
        settings.main_page = main_page;
    }
    settings.validate()?;

    match args.command {
        Command::Run => run_once(&settings).await,
        Command::Between { start, end } => print_between(&settings, start, end),
        Command::Schedule => print_schedule(&settings, &args.config),
    }
}

#[instrument(level = "info", skip_all)]
async fn run_once(settings: &Settings) -> Result<(), Box<dyn Error>> {
    info!(page = %settings.main_page, base_dir = %settings.base_dir.display(), "mid_news run starting");

    if let Err(e) = ensure_writable_dir(&settings.base_dir).await {
        error!(
            path = %settings.base_dir.display(),
            error = %e,
            "Base directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let mut store = SqliteStore::open(&settings.database)?;
    let mut renderer = HttpRenderer::new(settings)?;

    match pipeline::run(settings, &mut renderer, &mut store).await {
        Ok(summary) => {
            info!(?summary, "mid_news run finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            Err(e.into())
        }
    }
}

fn print_between(
    settings: &Settings,
    start: chrono::NaiveDateTime,
    end: chrono::NaiveDateTime,
) -> Result<(), Box<dyn Error>> {
    let store = SqliteStore::open(&settings.database)?;
    let records = store.find_between(start, end)?;
    info!(count = records.len(), %start, %end, "Queried records");
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn print_schedule(settings: &Settings, config: &std::path::Path) -> Result<(), Box<dyn Error>> {
    let exe = std::env::current_exe()?;
    let config = std::fs::canonicalize(config).unwrap_or_else(|_| config.to_path_buf());
    for (name, expr) in settings.cron.entries() {
        println!(
            "{expr} {} --config {} run # {name}",
            exe.display(),
            config.display()
        );
    }
    Ok(())
}

//! Snipster command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration and logging, then pick a repository backend.
//! - Hand the parsed command to the backend-agnostic dispatcher.

mod cli;
mod commands;
mod config;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use commands::{execute, OutputFormat};
use config::{AppConfig, DatabaseLocation};
use log::info;
use snipster_core::db::open_db;
use snipster_core::{init_logging, InMemorySnippetRepository, SqliteSnippetRepository};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?.with_overrides(cli.memory, cli.database.as_deref())?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok command={} backend={} home={} version={}",
        cli.command.name(),
        config.database.backend_name(),
        config.home.display(),
        snipster_core::core_version()
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut out = std::io::stdout().lock();

    match &config.database {
        DatabaseLocation::Memory => {
            let mut repo = InMemorySnippetRepository::new();
            execute(cli.command, &mut repo, format, &mut out)
        }
        DatabaseLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory `{}`", parent.display())
                })?;
            }
            let mut conn = open_db(path)
                .with_context(|| format!("failed to open database `{}`", path.display()))?;
            let mut repo = SqliteSnippetRepository::try_new(&mut conn)?;
            execute(cli.command, &mut repo, format, &mut out)
        }
    }
}

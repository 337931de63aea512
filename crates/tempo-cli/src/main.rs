use std::io::IsTerminal;

use chrono::Utc;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tempo_core::error::CoreError;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::store::{StoreError, TaskStore};

mod cli;
mod commands;
mod config;
mod parser;
mod store;
mod util;
mod views;

const LOG_ENV: &str = "TEMPO_LOG";
const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() {
    init_tracing();

    let cli = cli::Cli::parse();
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Failed to load configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &config) {
        handle_error(e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

fn run(cli: cli::Cli, config: &Config) -> anyhow::Result<()> {
    let ctx = config.calendar()?;
    let now = Utc::now();
    let mut store = TaskStore::open(&config.store_path)?;
    tracing::debug!(timezone = %ctx.timezone(), store = %config.store_path.display(), "Starting");

    match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&mut store, command, &ctx, now),
        cli::Commands::Agenda(command) => {
            commands::agenda::show_agenda(&store, command, config, &ctx, now)
        }
        cli::Commands::Preview(command) => {
            commands::preview::preview_series(&store, command, config, &ctx, now)
        }
        cli::Commands::Complete(command) => {
            commands::complete::complete_task(&mut store, command, &ctx, now)
        }
        cli::Commands::Edit(command) => commands::edit::edit_task(&mut store, command, &ctx, now),
        cli::Commands::Delete(command) => commands::delete::delete_task(&mut store, command),
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} Not found: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidTimezone(tz) => {
                eprintln!(
                    "{} Unknown timezone {}. Use an IANA name such as Europe/Berlin",
                    "Error:".style(error_style),
                    tz.yellow()
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), core_error),
        }
    } else if let Some(StoreError::AmbiguousId(prefix, tasks)) = err.downcast_ref::<StoreError>() {
        eprintln!("{} Ambiguous ID '{}'.", "Error:".style(error_style), prefix);
        eprintln!("Did you mean one of these?");
        for (id, title) in tasks {
            eprintln!("  {} ({})", id.yellow(), title);
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}

mod cli;
mod config;
mod db;
mod engine;
mod models;
mod playback;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Count { times }) => {
            handlers::handle_count(&conn, &config, times)?;
        }
        Some(Commands::Goal { malas }) => {
            handlers::handle_goal(&conn, &config, malas)?;
        }
        Some(Commands::Speed { speed }) => {
            handlers::handle_speed(&mut config, speed)?;
        }
        Some(Commands::Stats { week }) => {
            handlers::handle_stats(&conn, &config, week)?;
        }
        Some(Commands::Sounds { action }) => {
            handlers::handle_sounds(&conn, &action)?;
        }
        Some(Commands::Reset { target }) => {
            handlers::handle_reset(&conn, &config, &target)?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&conn, &config)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}

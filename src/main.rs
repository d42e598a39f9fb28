mod cli;
mod config;
mod db;
mod engine;
mod models;
mod sensors;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::MetaRepo;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    if MetaRepo::get(&conn, "installed_at")?.is_none() {
        let today = chrono::Local::now().date_naive();
        MetaRepo::set(&conn, "installed_at", &today.format("%Y-%m-%d").to_string())?;
        config.save().context("Writing default config")?;
        log::info!("initialized data store at {:?}", db_path);
    }

    match cli.command {
        Commands::Log {
            prayer,
            status,
            jamaah,
            friday,
            date,
        } => {
            handlers::handle_log(&conn, &config, &prayer, &status, jamaah, &friday, &date)?;
        }
        Commands::Today => {
            handlers::handle_today(&conn, &config)?;
        }
        Commands::Streak => {
            handlers::handle_streak(&conn, &config)?;
        }
        Commands::Heatmap { days } => {
            handlers::handle_heatmap(&conn, &config, days)?;
        }
        Commands::Stats { month } => {
            handlers::handle_stats(&conn, month)?;
        }
        Commands::Habit { action } => {
            handlers::handle_habit(&conn, &config, &action)?;
        }
        Commands::Qibla { mag } => {
            handlers::handle_qibla(&config, &mag)?;
        }
        Commands::Hijri { date } => {
            handlers::handle_hijri(&config, &date)?;
        }
        Commands::Export => {
            handlers::handle_export(&conn, &config)?;
        }
    }

    Ok(())
}

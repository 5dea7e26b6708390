//! Recreates the warehouse schema from scratch. Run this before a re-load:
//! the pipeline is not idempotent, so re-running over the same inputs without
//! a reset doubles every table.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use playlog_etl::config::load_file_config;
use playlog_etl::warehouse::SqliteWarehouse;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file (db_path is read from it).
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database file.
    #[clap(long)]
    pub db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = cli_args
        .config
        .as_deref()
        .map(load_file_config)
        .transpose()?;
    let db_path = file_config
        .and_then(|f| f.db_path.map(PathBuf::from))
        .or(cli_args.db)
        .ok_or_else(|| anyhow!("db path must be specified via --db or in config file"))?;

    let store = SqliteWarehouse::open(&db_path)?;
    store.reset()?;
    println!("Warehouse schema recreated at {}", db_path.display());

    Ok(())
}

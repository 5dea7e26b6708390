use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playlog_etl::config::{self, AppConfig};
use playlog_etl::loader;
use playlog_etl::warehouse::SqliteWarehouse;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database file. Created if missing.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Root directory of song metadata files.
    #[clap(long, value_parser = parse_path)]
    pub song_data: Option<PathBuf>,

    /// Root directory of play log files.
    #[clap(long, value_parser = parse_path)]
    pub log_data: Option<PathBuf>,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db.clone(),
            song_data_dir: args.song_data.clone(),
            log_data_dir: args.log_data.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::INFO.into())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli_args = CliArgs::parse();
    let file_config = cli_args
        .config
        .as_deref()
        .map(config::load_file_config)
        .transpose()?;
    let config = AppConfig::resolve(&(&cli_args).into(), file_config)?;

    let mut store = SqliteWarehouse::open(&config.db_path)?;
    loader::run(&mut store, &config)?;

    Ok(())
}

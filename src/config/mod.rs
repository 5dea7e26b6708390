mod file_config;

pub use file_config::{load_file_config, FileConfig};

use anyhow::Result;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub song_data_dir: Option<PathBuf>,
    pub log_data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the SQLite warehouse database, created on first run.
    pub db_path: PathBuf,
    /// Root directory of song metadata files.
    pub song_data_dir: PathBuf,
    /// Root directory of play log files.
    pub log_data_dir: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db or in config file")
            })?;

        let song_data_dir = file
            .song_data_dir
            .map(PathBuf::from)
            .or_else(|| cli.song_data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("song_data_dir must be specified via --song-data or in config file")
            })?;

        let log_data_dir = file
            .log_data_dir
            .map(PathBuf::from)
            .or_else(|| cli.log_data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("log_data_dir must be specified via --log-data or in config file")
            })?;

        Ok(Self {
            db_path,
            song_data_dir,
            log_data_dir,
        })
    }
}

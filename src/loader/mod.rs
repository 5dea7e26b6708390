//! Pipeline driver: walks each data root and loads one file per transaction.

mod events;
mod songs;

pub use events::{load_log_file, TimeParts};
pub use songs::load_song_file;

use crate::config::AppConfig;
use crate::files::list_json_files;
use crate::warehouse::SqliteWarehouse;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

pub type FileLoader = fn(&Connection, &Path) -> Result<()>;

/// Enumerate the data files under `root` and apply `load` to each, committing
/// after every file. A failure mid-file rolls that file's writes back and
/// aborts the run; files committed earlier stay committed.
pub fn process_directory(
    store: &mut SqliteWarehouse,
    root: &Path,
    load: FileLoader,
) -> Result<usize> {
    let all_files = list_json_files(root);
    let num_files = all_files.len();
    info!("{} files found in {}", num_files, root.display());

    for (i, datafile) in all_files.iter().enumerate() {
        let tx = store.transaction()?;
        load(&tx, datafile).with_context(|| format!("failed to load {}", datafile.display()))?;
        tx.commit()?;
        info!("{}/{} files processed", i + 1, num_files);
    }

    Ok(num_files)
}

/// Run the full pipeline: song metadata first so the event loader can resolve
/// catalog references, then the play logs.
pub fn run(store: &mut SqliteWarehouse, config: &AppConfig) -> Result<()> {
    process_directory(store, &config.song_data_dir, load_song_file)?;
    process_directory(store, &config.log_data_dir, load_log_file)?;
    Ok(())
}

//! Recursive enumeration of line-delimited JSON data files.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every `.json` file under `root` as an absolute path, in directory
/// traversal order. A missing or unreadable root yields an empty list.
pub fn list_json_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "json")
                .unwrap_or(false)
        })
        .filter_map(|entry| entry.path().canonicalize().ok())
        .collect()
}

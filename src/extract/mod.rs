//! Parsing of line-delimited JSON data files into typed records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The page value marking a "song played" event. Every other page type is
/// discarded by the event loader.
pub const SONG_PLAY_PAGE: &str = "NextSong";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed JSON line: {source}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a file as one JSON object per line. Blank lines are skipped; a
/// malformed line aborts the whole file.
pub fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExtractError> {
    let text = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_owned(),
        source,
    })?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ExtractError::MalformedLine {
                path: path.to_owned(),
                line: index + 1,
                source,
            })
        })
        .collect()
}

/// One record of a song metadata file: a song and its performing artist.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

/// One user interaction event from a play log file. Only "NextSong" rows
/// carry the full set of fields, so most of them are optional.
#[derive(Clone, Deserialize, Debug)]
pub struct PlayEvent {
    pub page: String,
    pub ts: i64,
    #[serde(rename = "userId", deserialize_with = "string_or_number", default)]
    pub user_id: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    #[serde(rename = "sessionId")]
    pub session_id: i64,
    pub location: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
}

impl PlayEvent {
    pub fn is_song_play(&self) -> bool {
        self.page == SONG_PLAY_PAGE
    }
}

// The raw logs are inconsistent about userId: sometimes a JSON string,
// sometimes a number, sometimes null.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for userId, got {}",
            other
        ))),
    }
}

//! Loads play log files into the time, users and songplays tables.

use crate::extract::{read_json_lines, PlayEvent};
use crate::warehouse::schema::{SONGPLAYS_TABLE, TIME_TABLE, USERS_TABLE};
use crate::warehouse::{find_song_by_play, insert_row};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// Calendar breakdown of an event timestamp.
///
/// Conventions are pinned: timestamps are interpreted as UTC, `week` is the
/// ISO-8601 week number, and `weekday` counts Monday=0 through Sunday=6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time_ms: i64,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeParts {
    pub fn from_epoch_ms(ms: i64) -> Result<TimeParts> {
        let dt: DateTime<Utc> = Utc
            .timestamp_millis_opt(ms)
            .single()
            .with_context(|| format!("timestamp {} is out of range", ms))?;
        Ok(TimeParts {
            start_time_ms: ms,
            hour: dt.hour(),
            day: dt.day(),
            week: dt.iso_week().week(),
            month: dt.month(),
            year: dt.year(),
            weekday: dt.weekday().num_days_from_monday(),
        })
    }
}

/// Process one play log file: keep only "NextSong" events, insert one time
/// and one user row per event (no dedup), resolve the catalog reference, and
/// insert the songplay fact row. A resolution miss leaves both ids NULL.
pub fn load_log_file(conn: &Connection, path: &Path) -> Result<()> {
    let events: Vec<PlayEvent> = read_json_lines(path)?;

    for event in events.iter().filter(|e| e.is_song_play()) {
        let time = TimeParts::from_epoch_ms(event.ts)?;
        insert_row(
            conn,
            &TIME_TABLE,
            params![
                time.start_time_ms,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday,
            ],
        )?;

        insert_row(
            conn,
            &USERS_TABLE,
            params![
                event.user_id,
                event.first_name,
                event.last_name,
                event.gender,
                event.level,
            ],
        )?;

        let resolved = match (&event.song, &event.artist, event.length) {
            (Some(song), Some(artist), Some(length)) => {
                find_song_by_play(conn, song, artist, length)?
            }
            _ => None,
        };
        let (song_id, artist_id) = match &resolved {
            Some((song_id, artist_id)) => (Some(song_id.as_str()), Some(artist_id.as_str())),
            None => (None, None),
        };

        insert_row(
            conn,
            &SONGPLAYS_TABLE,
            params![
                event.ts,
                event.user_id,
                event.level,
                song_id,
                artist_id,
                event.session_id,
                event.location,
                event.user_agent,
            ],
        )?;
    }

    Ok(())
}

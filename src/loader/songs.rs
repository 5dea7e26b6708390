//! Loads song metadata files into the songs and artists tables.

use crate::extract::{read_json_lines, SongRecord};
use crate::warehouse::insert_row;
use crate::warehouse::schema::{ARTISTS_TABLE, SONGS_TABLE};
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Insert one song row and one artist row per record in the file. Re-running
/// over the same file inserts duplicates; the pipeline does not dedup.
pub fn load_song_file(conn: &Connection, path: &Path) -> Result<()> {
    let records: Vec<SongRecord> = read_json_lines(path)?;
    for record in &records {
        insert_row(
            conn,
            &SONGS_TABLE,
            params![
                record.song_id,
                record.title,
                record.artist_id,
                record.year,
                record.duration,
            ],
        )?;
        insert_row(
            conn,
            &ARTISTS_TABLE,
            params![
                record.artist_id,
                record.artist_name,
                record.artist_location,
                record.artist_latitude,
                record.artist_longitude,
            ],
        )?;
    }
    Ok(())
}

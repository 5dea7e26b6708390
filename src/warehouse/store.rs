//! SQLite-backed warehouse store.

use super::schema::{Table, WAREHOUSE_TABLES};
use rusqlite::{Connection, OptionalExtension, ToSql, Transaction};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised by the store. A failed resolution lookup is not one of
/// these: a missing catalog match is an expected outcome.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open warehouse database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("failed to set up warehouse schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("insert into {table} failed: {source}")]
    Write {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("song/artist lookup failed: {0}")]
    Lookup(#[source] rusqlite::Error),

    #[error("transaction error: {0}")]
    Transaction(#[source] rusqlite::Error),
}

/// Owns the single connection to the warehouse database. Creates the schema
/// on first open against an empty database.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(StoreError::Open)?;

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);

        if table_count == 0 {
            info!("Creating warehouse schema ({} tables)", WAREHOUSE_TABLES.len());
            create_schema(&conn)?;
        }

        Ok(SqliteWarehouse { conn })
    }

    /// Drop and recreate every warehouse table. Used by the init binary and
    /// by operators who want a clean re-run.
    pub fn reset(&self) -> Result<(), StoreError> {
        for table in WAREHOUSE_TABLES {
            self.conn
                .execute(&table.drop_sql(), [])
                .map_err(StoreError::Schema)?;
        }
        create_schema(&self.conn)
    }

    pub fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        self.conn.transaction().map_err(StoreError::Transaction)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    for table in WAREHOUSE_TABLES {
        conn.execute(&table.create_sql(), [])
            .map_err(StoreError::Schema)?;
        for index_sql in table.indices {
            conn.execute(index_sql, []).map_err(StoreError::Schema)?;
        }
    }
    Ok(())
}

/// Issue one parameterized insert. Values must be ordered as the table's
/// insert columns. Never commits; the caller owns the transaction.
pub fn insert_row(
    conn: &Connection,
    table: &Table,
    values: &[&dyn ToSql],
) -> Result<(), StoreError> {
    let mut stmt = conn
        .prepare_cached(&table.insert_sql())
        .map_err(|source| StoreError::Write {
            table: table.name,
            source,
        })?;
    stmt.execute(values).map_err(|source| StoreError::Write {
        table: table.name,
        source,
    })?;
    Ok(())
}

/// Resolve a played (title, artist name, duration) against the catalog.
/// Exact equality on all three fields; `Ok(None)` is the normal miss case.
pub fn find_song_by_play(
    conn: &Connection,
    title: &str,
    artist_name: &str,
    duration: f64,
) -> Result<Option<(String, String)>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.song_id, s.artist_id FROM songs s \
             JOIN artists a ON s.artist_id = a.artist_id \
             WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3",
        )
        .map_err(StoreError::Lookup)?;
    stmt.query_row(rusqlite::params![title, artist_name, duration], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })
    .optional()
    .map_err(StoreError::Lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::schema::{ARTISTS_TABLE, SONGS_TABLE, USERS_TABLE};
    use rusqlite::params;
    use tempfile::TempDir;

    fn create_tmp_warehouse() -> (SqliteWarehouse, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("warehouse.db");
        let store = SqliteWarehouse::open(&db_path).unwrap();
        (store, temp_dir)
    }

    fn count_rows(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn open_creates_all_tables() {
        let (store, _temp_dir) = create_tmp_warehouse();
        for table in WAREHOUSE_TABLES {
            assert_eq!(count_rows(store.connection(), table.name), 0);
        }
    }

    #[test]
    fn open_existing_database_keeps_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("warehouse.db");
        {
            let store = SqliteWarehouse::open(&db_path).unwrap();
            insert_row(
                store.connection(),
                &USERS_TABLE,
                params!["8", "Kaylee", "Summers", "F", "free"],
            )
            .unwrap();
        }
        let store = SqliteWarehouse::open(&db_path).unwrap();
        assert_eq!(count_rows(store.connection(), "users"), 1);
    }

    #[test]
    fn reset_drops_existing_rows() {
        let (store, _temp_dir) = create_tmp_warehouse();
        insert_row(
            store.connection(),
            &USERS_TABLE,
            params!["8", "Kaylee", "Summers", "F", "free"],
        )
        .unwrap();
        store.reset().unwrap();
        assert_eq!(count_rows(store.connection(), "users"), 0);
    }

    #[test]
    fn inserted_song_round_trips() {
        let (store, _temp_dir) = create_tmp_warehouse();
        insert_row(
            store.connection(),
            &SONGS_TABLE,
            params!["S1", "T", "A1", 2000, 200.5],
        )
        .unwrap();

        let (title, artist_id, year, duration): (String, String, i64, f64) = store
            .connection()
            .query_row(
                "SELECT title, artist_id, year, duration FROM songs WHERE song_id = ?1",
                params!["S1"],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(title, "T");
        assert_eq!(artist_id, "A1");
        assert_eq!(year, 2000);
        assert_eq!(duration, 200.5);
    }

    #[test]
    fn find_song_by_play_hit_and_miss() {
        let (store, _temp_dir) = create_tmp_warehouse();
        insert_row(
            store.connection(),
            &SONGS_TABLE,
            params!["S1", "Setanta matins", "A1", 0, 305.162],
        )
        .unwrap();
        insert_row(
            store.connection(),
            &ARTISTS_TABLE,
            params!["A1", "Elena", None::<String>, None::<f64>, None::<f64>],
        )
        .unwrap();

        let hit = find_song_by_play(store.connection(), "Setanta matins", "Elena", 305.162)
            .unwrap();
        assert_eq!(hit, Some(("S1".to_owned(), "A1".to_owned())));

        // Duration differs, so the exact-match lookup misses.
        let miss =
            find_song_by_play(store.connection(), "Setanta matins", "Elena", 305.0).unwrap();
        assert_eq!(miss, None);

        let miss =
            find_song_by_play(store.connection(), "Setanta matins", "Someone", 305.162).unwrap();
        assert_eq!(miss, None);
    }

    #[test]
    fn duplicate_inserts_are_allowed() {
        let (store, _temp_dir) = create_tmp_warehouse();
        for _ in 0..2 {
            insert_row(
                store.connection(),
                &SONGS_TABLE,
                params!["S1", "T", "A1", 2000, 200.5],
            )
            .unwrap();
        }
        assert_eq!(count_rows(store.connection(), "songs"), 2);
    }
}

pub mod schema;
mod store;

pub use store::{find_song_by_play, insert_row, SqliteWarehouse, StoreError};

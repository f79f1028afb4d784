//! SQLite-backed implementation of the `CatalogStore` port.
//!
//! Uses the normalized schema in `schema.sql`. Single-entry inserts run as
//! autocommit statements, one round trip per record. Bulk inserts share one
//! transaction and cached prepared statements.

use std::path::{Path, PathBuf};

use cadence_core::CatalogStore;
use cadence_domain::{
    CadenceError, CatalogCounts, CatalogEntry, CatalogIds, Playlist, PlaylistTrack, Result, Song,
    SongPatch, StoreKind,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::errors::InfraError;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Catalog store on a single SQLite database file.
#[derive(Debug)]
pub struct SqliteCatalogStore {
    conn: Option<Connection>,
    path: PathBuf,
    scratch: Option<TempDir>,
}

impl SqliteCatalogStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(map_sql_error)?;

        let journal_mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(map_sql_error)?;
        conn.pragma_update(None, "foreign_keys", true).map_err(map_sql_error)?;
        conn.pragma_update(None, "synchronous", "NORMAL").map_err(map_sql_error)?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;

        info!(db_path = %path.display(), journal_mode = %journal_mode, "sqlite catalog opened");

        Ok(Self { conn: Some(conn), path, scratch: None })
    }

    /// Open a database inside `dir` and remove the directory on teardown.
    pub fn open_in(dir: TempDir) -> Result<Self> {
        let mut store = Self::open(dir.path().join("catalog.db"))?;
        store.scratch = Some(dir);
        Ok(store)
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| CadenceError::Store(format!("{} is torn down", self.path.display())))
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        let path = &self.path;
        self.conn
            .as_mut()
            .ok_or_else(|| CadenceError::Store(format!("{} is torn down", path.display())))
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 =
            self.conn()?.query_row(sql, [], |row| row.get(0)).map_err(map_sql_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn playlist_song_ids(conn: &Connection, playlist_id: i64) -> Result<Vec<i64>> {
        let mut stmt = conn.prepare_cached(PLAYLIST_SONG_IDS_QUERY).map_err(map_sql_error)?;
        let ids = stmt
            .query_map(params![playlist_id], |row| row.get(0))
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .map_err(map_sql_error)?;
        Ok(ids)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn insert_entry(&mut self, entry: &CatalogEntry) -> Result<CatalogIds> {
        let conn = self.conn()?;
        insert_entry_with(conn, entry).map_err(map_sql_error)
    }

    fn insert_entries(&mut self, entries: &[CatalogEntry]) -> Result<usize> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        for entry in entries {
            insert_entry_with(&tx, entry).map_err(map_sql_error)?;
        }
        tx.commit().map_err(map_sql_error)?;
        Ok(entries.len())
    }

    fn playlist_tracks(&self, limit: Option<usize>) -> Result<Vec<PlaylistTrack>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(PLAYLIST_TRACKS_QUERY).map_err(map_sql_error)?;
        let tracks = stmt
            .query_map(params![limit_param(limit)], map_track_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;
        Ok(tracks)
    }

    fn songs(&self, limit: Option<usize>) -> Result<Vec<Song>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(SONGS_QUERY).map_err(map_sql_error)?;
        let songs = stmt
            .query_map(params![limit_param(limit)], map_song_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;
        Ok(songs)
    }

    fn playlist(&self, playlist_id: i64) -> Result<Option<Playlist>> {
        let conn = self.conn()?;
        let name: Option<String> = conn
            .query_row(
                "SELECT P_Name FROM P_Playlists WHERE P_ID = ?1",
                params![playlist_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)?;

        match name {
            Some(name) => Ok(Some(Playlist {
                id: playlist_id,
                name,
                song_ids: Self::playlist_song_ids(conn, playlist_id)?,
            })),
            None => Ok(None),
        }
    }

    fn playlists(&self, limit: Option<usize>) -> Result<Vec<Playlist>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(PLAYLISTS_QUERY).map_err(map_sql_error)?;
        let heads = stmt
            .query_map(params![limit_param(limit)], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        heads
            .into_iter()
            .map(|(id, name)| {
                Ok(Playlist { id, name, song_ids: Self::playlist_song_ids(conn, id)? })
            })
            .collect()
    }

    fn add_song_to_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<()> {
        let conn = self.conn()?;
        ensure_exists(conn, "SELECT 1 FROM P_Playlists WHERE P_ID = ?1", playlist_id, "playlist")?;
        ensure_exists(conn, "SELECT 1 FROM S_Songs WHERE S_ID = ?1", song_id, "song")?;

        conn.execute(
            "INSERT INTO P_Playlists_have_S_Songs (P_ID, S_ID) VALUES (?1, ?2)",
            params![playlist_id, song_id],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn remove_song_from_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let removed = self
            .conn()?
            .execute(
                "DELETE FROM P_Playlists_have_S_Songs WHERE P_ID = ?1 AND S_ID = ?2",
                params![playlist_id, song_id],
            )
            .map_err(map_sql_error)?;
        Ok(removed > 0)
    }

    fn update_songs(&mut self, patch: &SongPatch, limit: usize) -> Result<u64> {
        if patch.is_empty() || limit == 0 {
            return Ok(0);
        }

        let updated = self
            .conn()?
            .execute(
                UPDATE_SONGS_SQL,
                params![
                    patch.title,
                    patch.length,
                    patch.rating,
                    patch.yt_link,
                    usize_to_i64(limit)
                ],
            )
            .map_err(map_sql_error)?;
        Ok(updated as u64)
    }

    fn delete_songs(&mut self, limit: usize) -> Result<u64> {
        if limit == 0 {
            return Ok(0);
        }

        let conn = self.conn_mut()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        let limit = usize_to_i64(limit);
        tx.execute(DELETE_PLAYLIST_LINKS_SQL, params![limit]).map_err(map_sql_error)?;
        let deleted = tx.execute(DELETE_SONGS_SQL, params![limit]).map_err(map_sql_error)?;
        tx.commit().map_err(map_sql_error)?;

        debug!(deleted, "deleted oldest songs");
        Ok(deleted as u64)
    }

    fn counts(&self) -> Result<CatalogCounts> {
        Ok(CatalogCounts {
            artists: self.count("SELECT COUNT(*) FROM A_Artists")?,
            albums: self.count("SELECT COUNT(*) FROM Al_Albums")?,
            songs: self.count("SELECT COUNT(*) FROM S_Songs")?,
            playlists: self.count("SELECT COUNT(*) FROM P_Playlists")?,
            playlist_songs: self.count("SELECT COUNT(*) FROM P_Playlists_have_S_Songs")?,
        })
    }

    fn teardown(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| map_sql_error(err))?;
        }
        if let Some(dir) = self.scratch.take() {
            let location = dir.path().display().to_string();
            dir.close().map_err(|err| CadenceError::from(InfraError::from(err)))?;
            debug!(dir = %location, "removed sqlite scratch directory");
        }
        Ok(())
    }
}

/// Insert one entry statement by statement on `conn` (a plain connection or a
/// transaction).
fn insert_entry_with(conn: &Connection, entry: &CatalogEntry) -> rusqlite::Result<CatalogIds> {
    conn.prepare_cached("INSERT INTO A_Artists (A_Name) VALUES (?1)")?
        .execute(params![entry.artist_name])?;
    let artist_id = conn.last_insert_rowid();

    conn.prepare_cached("INSERT INTO Al_Albums (Al_Name) VALUES (?1)")?
        .execute(params![entry.album_name])?;
    let album_id = conn.last_insert_rowid();

    conn.prepare_cached("INSERT INTO Al_Albums_have_A_Artists (Al_ID, A_ID) VALUES (?1, ?2)")?
        .execute(params![album_id, artist_id])?;

    conn.prepare_cached("INSERT INTO P_Playlists (P_Name) VALUES (?1)")?
        .execute(params![entry.playlist_name])?;
    let playlist_id = conn.last_insert_rowid();

    conn.prepare_cached(
        "INSERT INTO S_Songs (S_Title, S_Length, S_Rating, S_YT_Link, S_Al_ID)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?
    .execute(params![
        entry.song.title,
        entry.song.length,
        entry.song.rating,
        entry.song.yt_link,
        album_id
    ])?;
    let song_id = conn.last_insert_rowid();

    conn.prepare_cached("INSERT INTO P_Playlists_have_S_Songs (P_ID, S_ID) VALUES (?1, ?2)")?
        .execute(params![playlist_id, song_id])?;

    Ok(CatalogIds { artist_id, album_id, playlist_id, song_id })
}

fn ensure_exists(conn: &Connection, sql: &str, id: i64, what: &str) -> Result<()> {
    let found = conn
        .query_row(sql, params![id], |_| Ok(()))
        .optional()
        .map_err(map_sql_error)?
        .is_some();
    if found {
        Ok(())
    } else {
        Err(CadenceError::NotFound(format!("{what} {id}")))
    }
}

const PLAYLIST_TRACKS_QUERY: &str = "SELECT P_ID, P_Name, S_ID, S_Title, S_Length, S_Rating,
        S_YT_Link, A_ID, A_Name, Al_ID, Al_Name
    FROM SongsInAPlaylist
    LIMIT ?1";

const SONGS_QUERY: &str = "SELECT S_ID, S_Title, S_Length, S_Rating, S_YT_Link, S_Al_ID
    FROM S_Songs
    ORDER BY S_ID
    LIMIT ?1";

const PLAYLISTS_QUERY: &str = "SELECT P_ID, P_Name FROM P_Playlists ORDER BY P_ID LIMIT ?1";

const PLAYLIST_SONG_IDS_QUERY: &str =
    "SELECT S_ID FROM P_Playlists_have_S_Songs WHERE P_ID = ?1 ORDER BY P_S_ID";

const UPDATE_SONGS_SQL: &str = "UPDATE S_Songs SET
        S_Title = COALESCE(?1, S_Title),
        S_Length = COALESCE(?2, S_Length),
        S_Rating = COALESCE(?3, S_Rating),
        S_YT_Link = COALESCE(?4, S_YT_Link)
    WHERE S_ID IN (SELECT S_ID FROM S_Songs ORDER BY S_ID LIMIT ?5)";

const DELETE_PLAYLIST_LINKS_SQL: &str = "DELETE FROM P_Playlists_have_S_Songs
    WHERE S_ID IN (SELECT S_ID FROM S_Songs ORDER BY S_ID LIMIT ?1)";

const DELETE_SONGS_SQL: &str =
    "DELETE FROM S_Songs WHERE S_ID IN (SELECT S_ID FROM S_Songs ORDER BY S_ID LIMIT ?1)";

fn map_track_row(row: &Row<'_>) -> rusqlite::Result<PlaylistTrack> {
    Ok(PlaylistTrack {
        playlist_id: row.get(0)?,
        playlist_name: row.get(1)?,
        song_id: row.get(2)?,
        song_title: row.get(3)?,
        song_length: row.get(4)?,
        song_rating: row.get(5)?,
        song_yt_link: row.get(6)?,
        artist_id: row.get(7)?,
        artist_name: row.get(8)?,
        album_id: row.get(9)?,
        album_name: row.get(10)?,
    })
}

fn map_song_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        length: row.get(2)?,
        rating: row.get(3)?,
        yt_link: row.get(4)?,
        album_id: row.get(5)?,
    })
}

/// SQLite treats a negative LIMIT as "no limit".
fn limit_param(limit: Option<usize>) -> i64 {
    limit.map_or(-1, usize_to_i64)
}

fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_sql_error(err: rusqlite::Error) -> CadenceError {
    CadenceError::from(InfraError::from(err))
}

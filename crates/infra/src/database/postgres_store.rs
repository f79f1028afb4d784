//! PostgreSQL-backed implementation of the `CatalogStore` port.
//!
//! Every store lives in its own schema (`cadence_run_<uuid>`) so concurrent
//! runs against one server never see each other's rows. Teardown drops the
//! schema with everything in it.
//!
//! The port is synchronous, so the store drives `tokio-postgres` on a private
//! current-thread runtime. The connection task only makes progress while one
//! of the store's calls is blocking on that runtime.

use std::future::Future;

use cadence_core::CatalogStore;
use cadence_domain::constants::POSTGRES_SCHEMA_PREFIX;
use cadence_domain::{
    CadenceError, CatalogCounts, CatalogEntry, CatalogIds, Playlist, PlaylistTrack, Result, Song,
    SongPatch, StoreKind,
};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, GenericClient, NoTls, Row, Statement};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::InfraError;

const SCHEMA_SQL: &str = include_str!("postgres_schema.sql");

/// Catalog store inside a dedicated PostgreSQL schema.
pub struct PostgresCatalogStore {
    runtime: Runtime,
    client: Option<Client>,
    statements: Option<InsertStatements>,
    connection: Option<JoinHandle<()>>,
    schema: String,
}

/// Insert statements prepared once per connection.
struct InsertStatements {
    artist: Statement,
    album: Statement,
    album_artist: Statement,
    playlist: Statement,
    song: Statement,
    playlist_song: Statement,
}

impl PostgresCatalogStore {
    /// Connect to `url` and create a fresh, uniquely named schema.
    pub fn connect(url: &str) -> Result<Self> {
        let schema = format!("{POSTGRES_SCHEMA_PREFIX}{}", Uuid::new_v4().simple());
        Self::connect_with_schema(url, schema)
    }

    /// Connect to `url` using `schema`, creating it when missing.
    pub fn connect_with_schema(url: &str, schema: String) -> Result<Self> {
        if !is_plain_identifier(&schema) {
            return Err(CadenceError::InvalidInput(format!("invalid schema name '{schema}'")));
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| CadenceError::from(InfraError::from(err)))?;

        let (client, connection) =
            runtime.block_on(tokio_postgres::connect(url, NoTls)).map_err(map_pg_error)?;
        let connection = runtime.spawn(async move {
            if let Err(err) = connection.await {
                error!(error = %err, "postgres connection terminated");
            }
        });

        let statements = runtime
            .block_on(async {
                client
                    .batch_execute(&format!(
                        "CREATE SCHEMA IF NOT EXISTS {schema}; SET search_path TO {schema};"
                    ))
                    .await?;
                client.batch_execute(SCHEMA_SQL).await?;
                InsertStatements::prepare(&client).await
            })
            .map_err(map_pg_error)?;

        info!(schema = %schema, "postgres catalog schema created");

        Ok(Self {
            runtime,
            client: Some(client),
            statements: Some(statements),
            connection: Some(connection),
            schema,
        })
    }

    /// Schema holding this store's tables.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or_else(|| self.torn_down())
    }

    fn torn_down(&self) -> CadenceError {
        CadenceError::Store(format!("postgres schema {} is torn down", self.schema))
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.client()?;
        self.block_on(client.query(sql, params)).map_err(map_pg_error)
    }

    fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.client()?;
        self.block_on(client.execute(sql, params)).map_err(map_pg_error)
    }
}

impl std::fmt::Debug for PostgresCatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresCatalogStore")
            .field("schema", &self.schema)
            .field("connected", &self.client.is_some())
            .finish()
    }
}

impl InsertStatements {
    async fn prepare(client: &Client) -> std::result::Result<Self, tokio_postgres::Error> {
        Ok(Self {
            artist: client
                .prepare("INSERT INTO A_Artists (A_Name) VALUES ($1) RETURNING A_ID")
                .await?,
            album: client
                .prepare("INSERT INTO Al_Albums (Al_Name) VALUES ($1) RETURNING Al_ID")
                .await?,
            album_artist: client
                .prepare("INSERT INTO Al_Albums_have_A_Artists (Al_ID, A_ID) VALUES ($1, $2)")
                .await?,
            playlist: client
                .prepare("INSERT INTO P_Playlists (P_Name) VALUES ($1) RETURNING P_ID")
                .await?,
            song: client
                .prepare(
                    "INSERT INTO S_Songs (S_Title, S_Length, S_Rating, S_YT_Link, S_Al_ID)
                     VALUES ($1, $2::float8, $3::float8, $4, $5)
                     RETURNING S_ID",
                )
                .await?,
            playlist_song: client
                .prepare("INSERT INTO P_Playlists_have_S_Songs (P_ID, S_ID) VALUES ($1, $2)")
                .await?,
        })
    }

    async fn insert<C: GenericClient>(
        &self,
        client: &C,
        entry: &CatalogEntry,
    ) -> std::result::Result<CatalogIds, tokio_postgres::Error> {
        let artist_id: i64 =
            client.query_one(&self.artist, &[&entry.artist_name]).await?.try_get(0)?;
        let album_id: i64 = client.query_one(&self.album, &[&entry.album_name]).await?.try_get(0)?;
        client.execute(&self.album_artist, &[&album_id, &artist_id]).await?;
        let playlist_id: i64 =
            client.query_one(&self.playlist, &[&entry.playlist_name]).await?.try_get(0)?;
        let song_id: i64 = client
            .query_one(
                &self.song,
                &[
                    &entry.song.title,
                    &entry.song.length,
                    &entry.song.rating,
                    &entry.song.yt_link,
                    &album_id,
                ],
            )
            .await?
            .try_get(0)?;
        client.execute(&self.playlist_song, &[&playlist_id, &song_id]).await?;

        Ok(CatalogIds { artist_id, album_id, playlist_id, song_id })
    }
}

impl CatalogStore for PostgresCatalogStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    fn insert_entry(&mut self, entry: &CatalogEntry) -> Result<CatalogIds> {
        let client = self.client()?;
        let statements = self.statements.as_ref().ok_or_else(|| self.torn_down())?;
        self.block_on(statements.insert(client, entry)).map_err(map_pg_error)
    }

    fn insert_entries(&mut self, entries: &[CatalogEntry]) -> Result<usize> {
        let (Some(client), Some(statements)) = (self.client.as_mut(), self.statements.as_ref())
        else {
            return Err(CadenceError::Store(format!(
                "postgres schema {} is torn down",
                self.schema
            )));
        };

        self.runtime
            .block_on(async {
                let tx = client.transaction().await?;
                for entry in entries {
                    statements.insert(&tx, entry).await?;
                }
                tx.commit().await
            })
            .map_err(map_pg_error)?;
        Ok(entries.len())
    }

    fn playlist_tracks(&self, limit: Option<usize>) -> Result<Vec<PlaylistTrack>> {
        let rows = self.query(PLAYLIST_TRACKS_QUERY, &[&limit_param(limit)])?;
        rows.iter().map(map_track_row).collect::<std::result::Result<_, _>>().map_err(map_pg_error)
    }

    fn songs(&self, limit: Option<usize>) -> Result<Vec<Song>> {
        let rows = self.query(SONGS_QUERY, &[&limit_param(limit)])?;
        rows.iter().map(map_song_row).collect::<std::result::Result<_, _>>().map_err(map_pg_error)
    }

    fn playlist(&self, playlist_id: i64) -> Result<Option<Playlist>> {
        let rows = self.query(PLAYLIST_QUERY, &[&playlist_id])?;
        rows.first().map(map_playlist_row).transpose().map_err(map_pg_error)
    }

    fn playlists(&self, limit: Option<usize>) -> Result<Vec<Playlist>> {
        let rows = self.query(PLAYLISTS_QUERY, &[&limit_param(limit)])?;
        rows.iter()
            .map(map_playlist_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(map_pg_error)
    }

    fn add_song_to_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<()> {
        if self.query("SELECT 1 FROM P_Playlists WHERE P_ID = $1", &[&playlist_id])?.is_empty() {
            return Err(CadenceError::NotFound(format!("playlist {playlist_id}")));
        }
        if self.query("SELECT 1 FROM S_Songs WHERE S_ID = $1", &[&song_id])?.is_empty() {
            return Err(CadenceError::NotFound(format!("song {song_id}")));
        }

        self.execute(
            "INSERT INTO P_Playlists_have_S_Songs (P_ID, S_ID) VALUES ($1, $2)",
            &[&playlist_id, &song_id],
        )?;
        Ok(())
    }

    fn remove_song_from_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let removed = self.execute(
            "DELETE FROM P_Playlists_have_S_Songs WHERE P_ID = $1 AND S_ID = $2",
            &[&playlist_id, &song_id],
        )?;
        Ok(removed > 0)
    }

    fn update_songs(&mut self, patch: &SongPatch, limit: usize) -> Result<u64> {
        if patch.is_empty() || limit == 0 {
            return Ok(0);
        }

        self.execute(
            UPDATE_SONGS_SQL,
            &[&patch.title, &patch.length, &patch.rating, &patch.yt_link, &usize_to_i64(limit)],
        )
    }

    fn delete_songs(&mut self, limit: usize) -> Result<u64> {
        if limit == 0 {
            return Ok(0);
        }

        let limit = usize_to_i64(limit);
        let Some(client) = self.client.as_mut() else {
            return Err(CadenceError::Store(format!(
                "postgres schema {} is torn down",
                self.schema
            )));
        };

        let deleted = self
            .runtime
            .block_on(async {
                let tx = client.transaction().await?;
                tx.execute(DELETE_PLAYLIST_LINKS_SQL, &[&limit]).await?;
                let deleted = tx.execute(DELETE_SONGS_SQL, &[&limit]).await?;
                tx.commit().await?;
                Ok::<_, tokio_postgres::Error>(deleted)
            })
            .map_err(map_pg_error)?;

        debug!(deleted, "deleted oldest songs");
        Ok(deleted)
    }

    fn counts(&self) -> Result<CatalogCounts> {
        let rows = self.query(COUNTS_QUERY, &[])?;
        let row = rows
            .first()
            .ok_or_else(|| CadenceError::Store("count query returned no rows".into()))?;

        let count = |idx: usize| -> Result<u64> {
            let value: i64 = row.try_get(idx).map_err(map_pg_error)?;
            Ok(u64::try_from(value).unwrap_or_default())
        };

        Ok(CatalogCounts {
            artists: count(0)?,
            albums: count(1)?,
            songs: count(2)?,
            playlists: count(3)?,
            playlist_songs: count(4)?,
        })
    }

    fn teardown(&mut self) -> Result<()> {
        // Statements hold a handle on the client; release them first.
        self.statements = None;

        if let Some(client) = self.client.take() {
            let drop_schema = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema);
            self.runtime.block_on(client.batch_execute(&drop_schema)).map_err(map_pg_error)?;
            debug!(schema = %self.schema, "dropped postgres catalog schema");
        }
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
        Ok(())
    }
}

const PLAYLIST_TRACKS_QUERY: &str = "SELECT P_ID, P_Name, S_ID, S_Title, S_Length, S_Rating,
        S_YT_Link, A_ID, A_Name, Al_ID, Al_Name
    FROM SongsInAPlaylist
    LIMIT $1";

const SONGS_QUERY: &str = "SELECT S_ID, S_Title, S_Length::float8, S_Rating::float8,
        S_YT_Link, S_Al_ID
    FROM S_Songs
    ORDER BY S_ID
    LIMIT $1";

const PLAYLISTS_QUERY: &str = "SELECT p.P_ID, p.P_Name,
        COALESCE(array_agg(l.S_ID ORDER BY l.P_S_ID) FILTER (WHERE l.S_ID IS NOT NULL),
                 ARRAY[]::BIGINT[])
    FROM P_Playlists p
        LEFT JOIN P_Playlists_have_S_Songs l ON l.P_ID = p.P_ID
    GROUP BY p.P_ID, p.P_Name
    ORDER BY p.P_ID
    LIMIT $1";

const PLAYLIST_QUERY: &str = "SELECT p.P_ID, p.P_Name,
        COALESCE(array_agg(l.S_ID ORDER BY l.P_S_ID) FILTER (WHERE l.S_ID IS NOT NULL),
                 ARRAY[]::BIGINT[])
    FROM P_Playlists p
        LEFT JOIN P_Playlists_have_S_Songs l ON l.P_ID = p.P_ID
    WHERE p.P_ID = $1
    GROUP BY p.P_ID, p.P_Name";

const UPDATE_SONGS_SQL: &str = "UPDATE S_Songs SET
        S_Title = COALESCE($1, S_Title),
        S_Length = COALESCE($2::float8, S_Length::float8),
        S_Rating = COALESCE($3::float8, S_Rating::float8),
        S_YT_Link = COALESCE($4, S_YT_Link)
    WHERE S_ID IN (SELECT S_ID FROM S_Songs ORDER BY S_ID LIMIT $5)";

const DELETE_PLAYLIST_LINKS_SQL: &str = "DELETE FROM P_Playlists_have_S_Songs
    WHERE S_ID IN (SELECT S_ID FROM S_Songs ORDER BY S_ID LIMIT $1)";

const DELETE_SONGS_SQL: &str =
    "DELETE FROM S_Songs WHERE S_ID IN (SELECT S_ID FROM S_Songs ORDER BY S_ID LIMIT $1)";

const COUNTS_QUERY: &str = "SELECT
        (SELECT COUNT(*) FROM A_Artists),
        (SELECT COUNT(*) FROM Al_Albums),
        (SELECT COUNT(*) FROM S_Songs),
        (SELECT COUNT(*) FROM P_Playlists),
        (SELECT COUNT(*) FROM P_Playlists_have_S_Songs)";

fn map_track_row(row: &Row) -> std::result::Result<PlaylistTrack, tokio_postgres::Error> {
    Ok(PlaylistTrack {
        playlist_id: row.try_get(0)?,
        playlist_name: row.try_get(1)?,
        song_id: row.try_get(2)?,
        song_title: row.try_get(3)?,
        song_length: row.try_get(4)?,
        song_rating: row.try_get(5)?,
        song_yt_link: row.try_get(6)?,
        artist_id: row.try_get(7)?,
        artist_name: row.try_get(8)?,
        album_id: row.try_get(9)?,
        album_name: row.try_get(10)?,
    })
}

fn map_song_row(row: &Row) -> std::result::Result<Song, tokio_postgres::Error> {
    Ok(Song {
        id: row.try_get(0)?,
        title: row.try_get(1)?,
        length: row.try_get(2)?,
        rating: row.try_get(3)?,
        yt_link: row.try_get(4)?,
        album_id: row.try_get(5)?,
    })
}

fn map_playlist_row(row: &Row) -> std::result::Result<Playlist, tokio_postgres::Error> {
    Ok(Playlist { id: row.try_get(0)?, name: row.try_get(1)?, song_ids: row.try_get(2)? })
}

/// `LIMIT NULL` is "no limit" in PostgreSQL.
fn limit_param(limit: Option<usize>) -> Option<i64> {
    limit.map(usize_to_i64)
}

fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Schema names are interpolated into DDL, so only `[a-z0-9_]` is accepted.
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.starts_with(|c: char| c.is_ascii_lowercase() || c == '_')
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn map_pg_error(err: tokio_postgres::Error) -> CadenceError {
    CadenceError::from(InfraError::from(err))
}

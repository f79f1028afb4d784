//! Document-oriented implementation of the `CatalogStore` port.
//!
//! Collections:
//! - `artists`, `albums`: `{ name }`
//! - `artists_albums`: `{ album_id, artist_id }`
//! - `songs`: `{ title, length, rating, yt_link, artist_id, album_id }`
//! - `playlists`: `{ name, songs: [song_id, ..] }` with member ids embedded
//!
//! There are no joins. `playlist_tracks` resolves song, album and artist
//! references in the application with one batched lookup per collection.

use std::collections::HashMap;
use std::path::Path;

use cadence_core::CatalogStore;
use cadence_domain::{
    CadenceError, CatalogCounts, CatalogEntry, CatalogIds, Playlist, PlaylistTrack, Result, Song,
    SongPatch, StoreKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;
use tracing::debug;

use super::db::{Collection, DocumentDb, Filter, Update};
use crate::errors::InfraError;

const ARTISTS: &str = "artists";
const ALBUMS: &str = "albums";
const ARTISTS_ALBUMS: &str = "artists_albums";
const SONGS: &str = "songs";
const PLAYLISTS: &str = "playlists";

const PLAYLIST_SONGS_FIELD: &str = "songs";

#[derive(Debug, Serialize, Deserialize)]
struct NamedDoc {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtistAlbumDoc {
    album_id: i64,
    artist_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SongDoc {
    title: String,
    length: f64,
    rating: f64,
    yt_link: String,
    #[serde(default)]
    artist_id: Option<i64>,
    #[serde(default)]
    album_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlaylistDoc {
    name: String,
    #[serde(default)]
    songs: Vec<i64>,
}

/// Catalog store on JSON document collections.
#[derive(Debug)]
pub struct DocumentCatalogStore {
    db: Option<DocumentDb>,
    scratch: Option<TempDir>,
}

impl DocumentCatalogStore {
    /// Open a document catalog at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self { db: Some(DocumentDb::open(path)?), scratch: None })
    }

    /// Open a database inside `dir` and remove the directory on teardown.
    pub fn open_in(dir: TempDir) -> Result<Self> {
        let mut store = Self::open(dir.path().join("documents.db"))?;
        store.scratch = Some(dir);
        Ok(store)
    }

    fn db(&self) -> Result<&DocumentDb> {
        self.db.as_ref().ok_or_else(torn_down)
    }

    fn db_mut(&mut self) -> Result<&mut DocumentDb> {
        self.db.as_mut().ok_or_else(torn_down)
    }

    fn collection(&self, name: &'static str) -> Result<Collection<'_>> {
        Ok(self.db()?.collection(name))
    }
}

impl CatalogStore for DocumentCatalogStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Document
    }

    fn insert_entry(&mut self, entry: &CatalogEntry) -> Result<CatalogIds> {
        let conn = self.db()?.connection();
        // Outside a transaction each insert commits on its own.
        insert_entry_with(|name| Collection::on(conn, name), entry)
    }

    fn insert_entries(&mut self, entries: &[CatalogEntry]) -> Result<usize> {
        self.db_mut()?.with_transaction(|tx| {
            for entry in entries {
                insert_entry_with(|name| Collection::on(tx, name), entry)?;
            }
            Ok(entries.len())
        })
    }

    fn playlist_tracks(&self, limit: Option<usize>) -> Result<Vec<PlaylistTrack>> {
        let playlists = self.collection(PLAYLISTS)?.find_as::<PlaylistDoc>(&Filter::All, None)?;

        let mut members: Vec<(i64, &str, i64)> = Vec::new();
        for (playlist_id, playlist) in &playlists {
            let mut song_ids = playlist.songs.clone();
            song_ids.sort_unstable();
            members.extend(
                song_ids.into_iter().map(|song_id| (*playlist_id, playlist.name.as_str(), song_id)),
            );
        }

        let songs: HashMap<i64, SongDoc> = self
            .collection(SONGS)?
            .find_as::<SongDoc>(&Filter::ids(members.iter().map(|(_, _, song)| *song)), None)?
            .into_iter()
            .collect();
        // A playlist may still reference a song that no longer exists.
        members.retain(|(_, _, song_id)| songs.contains_key(song_id));
        if let Some(limit) = limit {
            members.truncate(limit);
        }

        let album_ids: Vec<i64> = songs.values().filter_map(|song| song.album_id).collect();
        let albums: HashMap<i64, String> = self
            .collection(ALBUMS)?
            .find_as::<NamedDoc>(&Filter::ids(album_ids.iter().copied()), None)?
            .into_iter()
            .map(|(id, album)| (id, album.name))
            .collect();

        let mut album_artist: HashMap<i64, i64> = HashMap::new();
        for (_, link) in self
            .collection(ARTISTS_ALBUMS)?
            .find_as::<ArtistAlbumDoc>(&Filter::is_in("album_id", album_ids), None)?
        {
            album_artist.entry(link.album_id).or_insert(link.artist_id);
        }
        let artists: HashMap<i64, String> = self
            .collection(ARTISTS)?
            .find_as::<NamedDoc>(&Filter::ids(album_artist.values().copied()), None)?
            .into_iter()
            .map(|(id, artist)| (id, artist.name))
            .collect();

        let tracks = members
            .into_iter()
            .filter_map(|(playlist_id, playlist_name, song_id)| {
                let song = songs.get(&song_id)?;
                let album_id = song.album_id.filter(|id| albums.contains_key(id));
                let artist_id = album_id.and_then(|id| album_artist.get(&id).copied());
                Some(PlaylistTrack {
                    playlist_id,
                    playlist_name: playlist_name.to_string(),
                    song_id,
                    song_title: song.title.clone(),
                    song_length: song.length,
                    song_rating: song.rating,
                    song_yt_link: song.yt_link.clone(),
                    artist_id,
                    artist_name: artist_id.and_then(|id| artists.get(&id).cloned()),
                    album_id,
                    album_name: album_id.and_then(|id| albums.get(&id).cloned()),
                })
            })
            .collect();
        Ok(tracks)
    }

    fn songs(&self, limit: Option<usize>) -> Result<Vec<Song>> {
        let songs = self.collection(SONGS)?.find_as::<SongDoc>(&Filter::All, limit)?;
        Ok(songs.into_iter().map(|(id, song)| song_from_doc(id, song)).collect())
    }

    fn playlist(&self, playlist_id: i64) -> Result<Option<Playlist>> {
        let playlist = self.collection(PLAYLISTS)?.get_as::<PlaylistDoc>(playlist_id)?;
        Ok(playlist.map(|doc| Playlist { id: playlist_id, name: doc.name, song_ids: doc.songs }))
    }

    fn playlists(&self, limit: Option<usize>) -> Result<Vec<Playlist>> {
        let playlists = self.collection(PLAYLISTS)?.find_as::<PlaylistDoc>(&Filter::All, limit)?;
        Ok(playlists
            .into_iter()
            .map(|(id, doc)| Playlist { id, name: doc.name, song_ids: doc.songs })
            .collect())
    }

    fn add_song_to_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<()> {
        let playlists = self.collection(PLAYLISTS)?;
        if playlists.get(playlist_id)?.is_none() {
            return Err(CadenceError::NotFound(format!("playlist {playlist_id}")));
        }
        if self.collection(SONGS)?.get(song_id)?.is_none() {
            return Err(CadenceError::NotFound(format!("song {song_id}")));
        }

        playlists.update_many(
            &Filter::ids([playlist_id]),
            &Update::push(PLAYLIST_SONGS_FIELD, song_id),
            None,
        )?;
        Ok(())
    }

    fn remove_song_from_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let holding = Filter::And(vec![
            Filter::ids([playlist_id]),
            Filter::contains(PLAYLIST_SONGS_FIELD, song_id),
        ]);
        let changed = self.collection(PLAYLISTS)?.update_many(
            &holding,
            &Update::pull(PLAYLIST_SONGS_FIELD, song_id),
            None,
        )?;
        Ok(changed > 0)
    }

    fn update_songs(&mut self, patch: &SongPatch, limit: usize) -> Result<u64> {
        let fields = patch_fields(patch);
        if fields.is_empty() || limit == 0 {
            return Ok(0);
        }
        self.collection(SONGS)?.update_many(&Filter::All, &Update::Set(fields), Some(limit))
    }

    fn delete_songs(&mut self, limit: usize) -> Result<u64> {
        if limit == 0 {
            return Ok(0);
        }

        let deleted = self.db_mut()?.with_transaction(|tx| {
            let songs = Collection::on(tx, SONGS);
            let playlists = Collection::on(tx, PLAYLISTS);

            let doomed = songs.ids(&Filter::All, Some(limit))?;
            let members: Vec<Value> = doomed.iter().copied().map(Value::from).collect();
            playlists.pull_all(PLAYLIST_SONGS_FIELD, &members)?;
            songs.delete_many(&Filter::Ids(doomed), None)
        })?;

        debug!(deleted, "deleted oldest songs");
        Ok(deleted)
    }

    fn counts(&self) -> Result<CatalogCounts> {
        let db = self.db()?;
        Ok(CatalogCounts {
            artists: db.collection(ARTISTS).count(&Filter::All)?,
            albums: db.collection(ALBUMS).count(&Filter::All)?,
            songs: db.collection(SONGS).count(&Filter::All)?,
            playlists: db.collection(PLAYLISTS).count(&Filter::All)?,
            playlist_songs: db.collection(PLAYLISTS).sum_array_lengths(PLAYLIST_SONGS_FIELD)?,
        })
    }

    fn teardown(&mut self) -> Result<()> {
        if let Some(db) = self.db.take() {
            db.close()?;
        }
        if let Some(dir) = self.scratch.take() {
            let location = dir.path().display().to_string();
            dir.close().map_err(|err| CadenceError::from(InfraError::from(err)))?;
            debug!(dir = %location, "removed document scratch directory");
        }
        Ok(())
    }
}

/// Insert the five documents of one entry through `collection`, which binds
/// a collection name to either the bare connection or a transaction.
fn insert_entry_with<'c>(
    collection: impl Fn(&'static str) -> Collection<'c>,
    entry: &CatalogEntry,
) -> Result<CatalogIds> {
    let artist_id = collection(ARTISTS).insert_one(&NamedDoc { name: entry.artist_name.clone() })?;
    let album_id = collection(ALBUMS).insert_one(&NamedDoc { name: entry.album_name.clone() })?;
    collection(ARTISTS_ALBUMS).insert_one(&ArtistAlbumDoc { album_id, artist_id })?;

    let song_id = collection(SONGS).insert_one(&SongDoc {
        title: entry.song.title.clone(),
        length: entry.song.length,
        rating: entry.song.rating,
        yt_link: entry.song.yt_link.clone(),
        artist_id: Some(artist_id),
        album_id: Some(album_id),
    })?;
    let playlist_id = collection(PLAYLISTS)
        .insert_one(&PlaylistDoc { name: entry.playlist_name.clone(), songs: vec![song_id] })?;

    Ok(CatalogIds { artist_id, album_id, playlist_id, song_id })
}

fn patch_fields(patch: &SongPatch) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    if let Some(title) = &patch.title {
        fields.push(("title".to_string(), Value::from(title.as_str())));
    }
    if let Some(length) = patch.length {
        fields.push(("length".to_string(), Value::from(length)));
    }
    if let Some(rating) = patch.rating {
        fields.push(("rating".to_string(), Value::from(rating)));
    }
    if let Some(yt_link) = &patch.yt_link {
        fields.push(("yt_link".to_string(), Value::from(yt_link.as_str())));
    }
    fields
}

fn song_from_doc(id: i64, song: SongDoc) -> Song {
    Song {
        id,
        title: song.title,
        length: song.length,
        rating: song.rating,
        yt_link: song.yt_link,
        album_id: song.album_id,
    }
}

fn torn_down() -> CadenceError {
    CadenceError::Store("document store is torn down".into())
}

//! In-memory catalog store and provider mocks

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cadence_core::{CatalogStore, StoreLease, StoreProvider};
use cadence_domain::{
    CadenceError, CatalogCounts, CatalogEntry, CatalogIds, Playlist, PlaylistTrack,
    Result as DomainResult, Song, SongPatch, StoreKind,
};

/// Counters shared between a provider and the stores it hands out.
#[derive(Debug, Default)]
pub struct StoreStats {
    pub acquired: Cell<u32>,
    pub teardowns: Cell<u32>,
    pub last_counts: RefCell<Option<CatalogCounts>>,
}

/// Which call should fail, for error-path tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Failure {
    #[default]
    Never,
    Reads,
    BulkInsert,
    Teardown,
}

#[derive(Debug, Clone)]
struct AlbumRow {
    id: i64,
    name: String,
    artist_id: i64,
}

/// Catalog kept in plain vectors, ordered by id.
#[derive(Debug)]
pub struct InMemoryCatalogStore {
    artists: Vec<(i64, String)>,
    albums: Vec<AlbumRow>,
    playlists: Vec<Playlist>,
    songs: Vec<Song>,
    next_id: i64,
    failure: Failure,
    stats: Rc<StoreStats>,
}

impl InMemoryCatalogStore {
    pub fn new(failure: Failure, stats: Rc<StoreStats>) -> Self {
        Self {
            artists: Vec::new(),
            albums: Vec::new(),
            playlists: Vec::new(),
            songs: Vec::new(),
            next_id: 0,
            failure,
            stats,
        }
    }

    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn playlist_mut(&mut self, playlist_id: i64) -> DomainResult<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|playlist| playlist.id == playlist_id)
            .ok_or_else(|| CadenceError::NotFound(format!("playlist {playlist_id}")))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn insert_entry(&mut self, entry: &CatalogEntry) -> DomainResult<CatalogIds> {
        let artist_id = self.id();
        self.artists.push((artist_id, entry.artist_name.clone()));

        let album_id = self.id();
        self.albums.push(AlbumRow { id: album_id, name: entry.album_name.clone(), artist_id });

        let song_id = self.id();
        self.songs.push(Song {
            id: song_id,
            title: entry.song.title.clone(),
            length: entry.song.length,
            rating: entry.song.rating,
            yt_link: entry.song.yt_link.clone(),
            album_id: Some(album_id),
        });

        let playlist_id = self.id();
        self.playlists.push(Playlist {
            id: playlist_id,
            name: entry.playlist_name.clone(),
            song_ids: vec![song_id],
        });

        Ok(CatalogIds { artist_id, album_id, playlist_id, song_id })
    }

    fn insert_entries(&mut self, entries: &[CatalogEntry]) -> DomainResult<usize> {
        if self.failure == Failure::BulkInsert {
            return Err(CadenceError::Store("bulk insert rejected".into()));
        }
        for entry in entries {
            self.insert_entry(entry)?;
        }
        Ok(entries.len())
    }

    fn playlist_tracks(&self, limit: Option<usize>) -> DomainResult<Vec<PlaylistTrack>> {
        if self.failure == Failure::Reads {
            return Err(CadenceError::Store("read timed out".into()));
        }

        let mut tracks = Vec::new();
        for playlist in &self.playlists {
            let mut members: Vec<_> = playlist
                .song_ids
                .iter()
                .filter_map(|id| self.songs.iter().find(|song| song.id == *id))
                .collect();
            members.sort_by_key(|song| song.id);

            for song in members {
                let album = song.album_id.and_then(|id| self.albums.iter().find(|a| a.id == id));
                let artist = album
                    .and_then(|album| self.artists.iter().find(|(id, _)| *id == album.artist_id));
                tracks.push(PlaylistTrack {
                    playlist_id: playlist.id,
                    playlist_name: playlist.name.clone(),
                    song_id: song.id,
                    song_title: song.title.clone(),
                    song_length: song.length,
                    song_rating: song.rating,
                    song_yt_link: song.yt_link.clone(),
                    artist_id: artist.map(|(id, _)| *id),
                    artist_name: artist.map(|(_, name)| name.clone()),
                    album_id: album.map(|album| album.id),
                    album_name: album.map(|album| album.name.clone()),
                });
            }
        }

        if let Some(limit) = limit {
            tracks.truncate(limit);
        }
        Ok(tracks)
    }

    fn songs(&self, limit: Option<usize>) -> DomainResult<Vec<Song>> {
        Ok(self.songs.iter().take(limit.unwrap_or(usize::MAX)).cloned().collect())
    }

    fn playlist(&self, playlist_id: i64) -> DomainResult<Option<Playlist>> {
        Ok(self.playlists.iter().find(|playlist| playlist.id == playlist_id).cloned())
    }

    fn playlists(&self, limit: Option<usize>) -> DomainResult<Vec<Playlist>> {
        Ok(self.playlists.iter().take(limit.unwrap_or(usize::MAX)).cloned().collect())
    }

    fn add_song_to_playlist(&mut self, playlist_id: i64, song_id: i64) -> DomainResult<()> {
        if !self.songs.iter().any(|song| song.id == song_id) {
            return Err(CadenceError::NotFound(format!("song {song_id}")));
        }
        self.playlist_mut(playlist_id)?.song_ids.push(song_id);
        Ok(())
    }

    fn remove_song_from_playlist(&mut self, playlist_id: i64, song_id: i64) -> DomainResult<bool> {
        let playlist = self.playlist_mut(playlist_id)?;
        let before = playlist.song_ids.len();
        playlist.song_ids.retain(|id| *id != song_id);
        Ok(playlist.song_ids.len() != before)
    }

    fn update_songs(&mut self, patch: &SongPatch, limit: usize) -> DomainResult<u64> {
        let mut updated = 0;
        for song in self.songs.iter_mut().take(limit) {
            if let Some(rating) = patch.rating {
                song.rating = rating;
            }
            if let Some(title) = &patch.title {
                song.title = title.clone();
            }
            updated += 1;
        }
        Ok(updated)
    }

    fn delete_songs(&mut self, limit: usize) -> DomainResult<u64> {
        let doomed: Vec<i64> = self.songs.iter().take(limit).map(|song| song.id).collect();
        self.songs.retain(|song| !doomed.contains(&song.id));
        for playlist in &mut self.playlists {
            playlist.song_ids.retain(|id| !doomed.contains(id));
        }
        Ok(doomed.len() as u64)
    }

    fn counts(&self) -> DomainResult<CatalogCounts> {
        Ok(CatalogCounts {
            artists: self.artists.len() as u64,
            albums: self.albums.len() as u64,
            songs: self.songs.len() as u64,
            playlists: self.playlists.len() as u64,
            playlist_songs: self.playlists.iter().map(|p| p.song_ids.len() as u64).sum(),
        })
    }

    fn teardown(&mut self) -> DomainResult<()> {
        self.stats.teardowns.set(self.stats.teardowns.get() + 1);
        *self.stats.last_counts.borrow_mut() = Some(self.counts()?);
        if self.failure == Failure::Teardown {
            return Err(CadenceError::Store("could not drop store".into()));
        }
        Ok(())
    }
}

/// Provider handing out fresh in-memory stores.
#[derive(Debug, Default, Clone)]
pub struct CountingProvider {
    pub stats: Rc<StoreStats>,
    pub failure: Failure,
    pub label: Option<String>,
}

impl CountingProvider {
    pub fn failing(failure: Failure) -> Self {
        Self { failure, ..Self::default() }
    }

    pub fn labelled(label: &str) -> Self {
        Self { label: Some(label.to_string()), ..Self::default() }
    }

    pub fn acquired(&self) -> u32 {
        self.stats.acquired.get()
    }

    pub fn teardowns(&self) -> u32 {
        self.stats.teardowns.get()
    }

    pub fn last_counts(&self) -> Option<CatalogCounts> {
        *self.stats.last_counts.borrow()
    }
}

impl StoreProvider for CountingProvider {
    fn kind(&self) -> StoreKind {
        StoreKind::Sqlite
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("Memory")
    }

    fn acquire(&self) -> DomainResult<StoreLease> {
        self.stats.acquired.set(self.stats.acquired.get() + 1);
        let id = self.stats.acquired.get();
        let store = InMemoryCatalogStore::new(self.failure, Rc::clone(&self.stats));
        Ok(StoreLease::new(Box::new(store), format!("memory-{id}")))
    }
}

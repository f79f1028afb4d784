//! Port interfaces for music catalog stores
//!
//! These traits define the boundary between the workloads and the store
//! backends in `cadence-infra`. Calls are synchronous so a trial's timing
//! window covers exactly one store interaction.

use cadence_domain::{
    CatalogCounts, CatalogEntry, CatalogIds, Playlist, PlaylistTrack, Result, Song, SongPatch,
    StoreKind,
};

use super::lease::StoreLease;

/// A store holding the artist/album/song/playlist catalog.
pub trait CatalogStore {
    /// Backend family of this store
    fn kind(&self) -> StoreKind;

    /// Insert one entry with one statement (or document write) per record.
    fn insert_entry(&mut self, entry: &CatalogEntry) -> Result<CatalogIds>;

    /// Insert all entries in a single batch. Returns the number inserted.
    fn insert_entries(&mut self, entries: &[CatalogEntry]) -> Result<usize>;

    /// The "songs in a playlist" view, ordered by playlist then song.
    fn playlist_tracks(&self, limit: Option<usize>) -> Result<Vec<PlaylistTrack>>;

    /// Songs in insertion order.
    fn songs(&self, limit: Option<usize>) -> Result<Vec<Song>>;

    fn playlist(&self, playlist_id: i64) -> Result<Option<Playlist>>;

    fn playlists(&self, limit: Option<usize>) -> Result<Vec<Playlist>>;

    /// Append a song to a playlist.
    ///
    /// # Errors
    /// `NotFound` when either the playlist or the song does not exist.
    fn add_song_to_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<()>;

    /// Remove a song from a playlist. Returns whether a membership was removed.
    fn remove_song_from_playlist(&mut self, playlist_id: i64, song_id: i64) -> Result<bool>;

    /// Apply `patch` to the first `limit` songs. Returns the rows updated.
    fn update_songs(&mut self, patch: &SongPatch, limit: usize) -> Result<u64>;

    /// Delete the `limit` oldest songs and their playlist memberships.
    /// Returns the songs deleted.
    fn delete_songs(&mut self, limit: usize) -> Result<u64>;

    fn counts(&self) -> Result<CatalogCounts>;

    /// Release everything the store holds. Called once by [`StoreLease`].
    fn teardown(&mut self) -> Result<()>;
}

/// Hands out ephemeral stores, one per benchmark run.
pub trait StoreProvider {
    fn kind(&self) -> StoreKind;

    /// Label used for series and log lines.
    fn label(&self) -> &str {
        self.kind().label()
    }

    /// Create a fresh, empty store scoped to the returned lease.
    fn acquire(&self) -> Result<StoreLease>;
}

/// Source of synthetic catalog values.
pub trait SyntheticData {
    /// A person or band name
    fn name(&mut self) -> String;

    /// A single lowercase word
    fn word(&mut self) -> String;

    /// A short multi-word phrase
    fn catch_phrase(&mut self) -> String;

    /// A sentence ending in a period
    fn sentence(&mut self) -> String;

    fn url(&mut self) -> String;

    /// A positive decimal with the given number of integer and fractional
    /// digits, e.g. `decimal(2, 2)` could be `37.08`.
    fn decimal(&mut self, left_digits: u32, right_digits: u32) -> f64;
}

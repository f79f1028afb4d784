//! Music catalog records exchanged with the stores

use serde::{Deserialize, Serialize};

/// Song fields as generated, before a store assigns ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    /// Sentence-style title
    pub title: String,
    /// Length in minutes, two decimals
    pub length: f64,
    /// Rating, one decimal
    pub rating: f64,
    /// Link to the song video
    pub yt_link: String,
}

/// One generated row set: an artist with an album, a song on it and a
/// playlist holding the song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name of the artist on the album
    pub artist_name: String,
    /// Name of the album the song is on
    pub album_name: String,
    /// Name of the playlist holding the song
    pub playlist_name: String,
    /// The song itself
    pub song: NewSong,
}

/// Ids a store assigned while inserting one [`CatalogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIds {
    /// Id of the inserted artist
    pub artist_id: i64,
    /// Id of the inserted album
    pub album_id: i64,
    /// Id of the inserted playlist
    pub playlist_id: i64,
    /// Id of the inserted song
    pub song_id: i64,
}

/// A stored song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Store-assigned id
    pub id: i64,
    /// Title
    pub title: String,
    /// Length in minutes
    pub length: f64,
    /// Rating
    pub rating: f64,
    /// Link to the song video
    pub yt_link: String,
    /// Album the song is on, if it still exists
    pub album_id: Option<i64>,
}

/// A stored playlist with its member song ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Store-assigned id
    pub id: i64,
    /// Playlist name
    pub name: String,
    /// Member songs in insertion order
    pub song_ids: Vec<i64>,
}

/// One row of the "songs in a playlist" view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    /// Playlist holding the song
    pub playlist_id: i64,
    /// Name of that playlist
    pub playlist_name: String,
    /// Member song
    pub song_id: i64,
    /// Song title
    pub song_title: String,
    /// Song length in minutes
    pub song_length: f64,
    /// Song rating
    pub song_rating: f64,
    /// Song video link
    pub song_yt_link: String,
    /// Artist of the song's album, when linked
    pub artist_id: Option<i64>,
    /// Name of that artist
    pub artist_name: Option<String>,
    /// Album the song is on, when it exists
    pub album_id: Option<i64>,
    /// Name of that album
    pub album_name: Option<String>,
}

/// Partial song update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongPatch {
    /// New title
    pub title: Option<String>,
    /// New length in minutes
    pub length: Option<f64>,
    /// New rating
    pub rating: Option<f64>,
    /// New video link
    pub yt_link: Option<String>,
}

impl SongPatch {
    /// Patch that only changes the rating.
    pub fn rating(rating: f64) -> Self {
        Self { rating: Some(rating), ..Self::default() }
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.length.is_none()
            && self.rating.is_none()
            && self.yt_link.is_none()
    }
}

/// Row counts per catalog collection or table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    /// Artists
    pub artists: u64,
    /// Albums
    pub albums: u64,
    /// Songs
    pub songs: u64,
    /// Playlists
    pub playlists: u64,
    /// Playlist memberships (link rows or embedded ids)
    pub playlist_songs: u64,
}

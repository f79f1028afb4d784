//! Building catalog entries from a synthetic data source

use cadence_domain::{CatalogEntry, NewSong};

use super::ports::SyntheticData;

/// One entry: artist, album, playlist and a song linking them.
pub fn generate_entry(data: &mut dyn SyntheticData) -> CatalogEntry {
    let artist_name = data.name();
    let album_name = data.word();
    let playlist_name = data.catch_phrase();
    let title = data.sentence();
    let length = data.decimal(2, 2);
    let rating = data.decimal(1, 1);
    let yt_link = data.url();

    CatalogEntry {
        artist_name,
        album_name,
        playlist_name,
        song: NewSong { title, length, rating, yt_link },
    }
}

/// `count` entries drawn from `data` in order.
pub fn generate_entries(data: &mut dyn SyntheticData, count: usize) -> Vec<CatalogEntry> {
    (0..count).map(|_| generate_entry(&mut *data)).collect()
}

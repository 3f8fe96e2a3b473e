//! Services layered on top of the parser: grouping, caching and remote fetch.

pub mod grouping;
pub mod playlist_fetcher;
pub mod playlist_store;

pub use grouping::{
    group_by_country, group_by_key, group_by_language, group_live_channels_by_country,
    live_channels_for_country, representative_language, summarize_countries, CountrySummary,
    TrackGroup, UNSPECIFIED_KEY,
};
pub use playlist_fetcher::PlaylistFetcher;
pub use playlist_store::{InMemoryPlaylistStore, PlaylistStore};

//! Grouping of parsed tracks by country or language.
//!
//! Grouping borrows the playlist and never mutates it, so any number of
//! callers can group the same shared playlist concurrently.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Playlist, Track};

/// Group key for tracks without a value for the grouping attribute.
pub const UNSPECIFIED_KEY: &str = "UNSPECIFIED";

/// Tracks sharing one (case-insensitive) key, in playlist order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackGroup<'a> {
    pub key: String,
    pub tracks: Vec<&'a Track>,
}

impl<'a> TrackGroup<'a> {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether this group collects tracks without a key.
    pub fn is_unspecified(&self) -> bool {
        self.key == UNSPECIFIED_KEY
    }

    /// Most frequent language among the group's tracks.
    pub fn representative_language(&self) -> Option<String> {
        representative_language(self.tracks.iter().copied())
    }
}

/// Partition tracks by the key `selector` extracts.
///
/// Keys are trimmed and then compare case-insensitively, so `" fr"` and `"FR"`
/// share a group; the first trimmed spelling seen becomes the group key.
/// Blank or missing keys go to [`UNSPECIFIED_KEY`]. Groups come out
/// in first-seen order, tracks within a group in playlist order.
pub fn group_by_key<'a, F>(tracks: impl IntoIterator<Item = &'a Track>, selector: F) -> Vec<TrackGroup<'a>>
where
    F: Fn(&Track) -> Option<&str>,
{
    let mut groups: Vec<TrackGroup<'a>> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for track in tracks {
        let key = selector(track)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(UNSPECIFIED_KEY);

        let position = *index_by_key.entry(key.to_lowercase()).or_insert_with(|| {
            groups.push(TrackGroup {
                key: key.to_string(),
                tracks: Vec::new(),
            });
            groups.len() - 1
        });

        groups[position].tracks.push(track);
    }

    groups
}

/// Group every track by country code.
pub fn group_by_country(playlist: &Playlist) -> Vec<TrackGroup<'_>> {
    group_by_key(&playlist.tracks, |track| track.country_code.as_deref())
}

/// Group every track by language code.
pub fn group_by_language(playlist: &Playlist) -> Vec<TrackGroup<'_>> {
    group_by_key(&playlist.tracks, |track| track.language_code.as_deref())
}

/// Group live channels only by country code; movies and series are left out.
pub fn group_live_channels_by_country(playlist: &Playlist) -> Vec<TrackGroup<'_>> {
    group_by_key(
        playlist.tracks.iter().filter(|track| track.is_live_channel()),
        |track| track.country_code.as_deref(),
    )
}

/// Most frequent language (case-insensitive, reported lowercase).
///
/// Ties go to the lexicographically smallest code. `None` when no track has a
/// language.
pub fn representative_language<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for language in tracks
        .into_iter()
        .filter_map(|track| track.language_code.as_deref())
        .map(str::trim)
        .filter(|language| !language.is_empty())
    {
        *counts.entry(language.to_lowercase()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(left_code, left_count), (right_code, right_count)| {
            left_count
                .cmp(right_count)
                .then_with(|| right_code.cmp(left_code))
        })
        .map(|(code, _)| code)
}

/// Per-country digest of live channels.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub code: String,
    pub language: Option<String>,
    pub channel_count: usize,
}

/// Summarise live channels per country, in first-seen country order.
pub fn summarize_countries(playlist: &Playlist) -> Vec<CountrySummary> {
    group_live_channels_by_country(playlist)
        .into_iter()
        .map(|group| CountrySummary {
            language: group.representative_language(),
            channel_count: group.len(),
            code: group.key,
        })
        .collect()
}

/// Live channels whose country matches `code` case-insensitively.
///
/// [`UNSPECIFIED_KEY`] selects channels without a country.
pub fn live_channels_for_country<'a>(playlist: &'a Playlist, code: &str) -> Vec<&'a Track> {
    group_live_channels_by_country(playlist)
        .into_iter()
        .find(|group| group.key.eq_ignore_ascii_case(code.trim()))
        .map(|group| group.tracks)
        .unwrap_or_default()
}

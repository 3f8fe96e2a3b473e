use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder identifier assigned by the parser before a store hands out a real one.
pub const DEFAULT_PLAYLIST_ID: &str = "default";

/// Classification of a playlist entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Live TV channel.
    LiveChannel,
    /// Film or VOD entry.
    Movie,
    /// Episodic content.
    Series,
    /// Not determined.
    Unknown,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::LiveChannel => "LiveChannel",
            MediaKind::Movie => "Movie",
            MediaKind::Series => "Series",
            MediaKind::Unknown => "Unknown",
        }
    }

    /// Movies and series are served from the VOD catalogue.
    pub fn is_vod(&self) -> bool {
        matches!(self, MediaKind::Movie | MediaKind::Series)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeEntry {
    key: String,
    value: String,
}

/// Raw `key="value"` attributes of a metadata line.
///
/// Lookups ignore key case. Values keep their original casing and the first
/// spelling seen for a key is the one exposed when iterating or serializing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: BTreeMap<String, AttributeEntry>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing the value of an existing key regardless of case.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.entries
            .entry(key.to_lowercase())
            .and_modify(|entry| entry.value = value.clone())
            .or_insert(AttributeEntry { key, value });
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(|entry| entry.value.as_str())
    }

    /// Value for `key` when present and not blank, untrimmed.
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(original key, value)` pairs ordered by normalized key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A single playable entry extracted from a playlist.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// `tvg-id`, then display name, then stream URL. Never blank.
    pub id: String,
    pub name: String,
    pub media_kind: MediaKind,
    /// ISO 3166-1 alpha-2, uppercase.
    pub country_code: Option<String>,
    /// ISO 639-1, lowercase.
    pub language_code: Option<String>,
    pub group_title: Option<String>,
    pub logo_url: Option<String>,
    pub stream_url: String,
    pub attributes: Attributes,
}

impl Track {
    pub fn is_live_channel(&self) -> bool {
        self.media_kind == MediaKind::LiveChannel
    }
}

/// Result of parsing one playlist stream.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    /// Same tracks under a different identifier.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracks: self.tracks,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

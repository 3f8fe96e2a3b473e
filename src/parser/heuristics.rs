//! Heuristic classification of tracks from free text.
//!
//! Country prefixes are data: adding a locale means adding a row to
//! [`COUNTRY_PREFIXES`], the matching logic stays the same.

use crate::models::MediaKind;

/// A display-name prefix implying a country and language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryPrefix {
    /// ASCII token, matched case-insensitively.
    pub token: &'static str,
    /// ISO 3166-1 alpha-2, uppercase.
    pub country: &'static str,
    /// ISO 639-1, lowercase.
    pub language: Option<&'static str>,
}

/// Checked in order; the first matching row wins.
pub const COUNTRY_PREFIXES: &[CountryPrefix] = &[CountryPrefix {
    token: "FR",
    country: "FR",
    language: Some("fr"),
}];

const PREFIX_SEPARATORS: [char; 4] = [' ', '|', '-', ':'];

const SERIES_MARKERS: [&str; 2] = ["series", "séries"];
const MOVIE_MARKERS: [&str; 3] = ["vod", "movies", "films"];

/// Display name after prefix stripping, with the locale the prefix implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolution {
    pub name: String,
    pub country: Option<&'static str>,
    pub language: Option<&'static str>,
}

/// Match `token` at the start of `value` in `[TOKEN]` or `TOKEN<separators>` form.
///
/// Returns the remainder with leading whitespace removed. A bare token with
/// nothing after it does not match.
pub fn match_prefix<'a>(value: &'a str, token: &str) -> Option<&'a str> {
    let value = value.trim_start();
    if value.trim().is_empty() {
        return None;
    }

    let token_len = token.len();

    if value.starts_with('[')
        && value
            .get(1..1 + token_len)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(token))
        && value
            .get(1 + token_len..)
            .is_some_and(|rest| rest.starts_with(']'))
    {
        return Some(value[token_len + 2..].trim_start());
    }

    if !value
        .get(..token_len)
        .is_some_and(|candidate| candidate.eq_ignore_ascii_case(token))
    {
        return None;
    }

    let after_token = &value[token_len..];
    let remainder = after_token.trim_start_matches(PREFIX_SEPARATORS);
    if remainder.len() == after_token.len() {
        return None;
    }

    Some(remainder.trim_start())
}

/// Strip known country prefixes from a raw display name.
///
/// Stripping repeats until no prefix matches, so running it again on the
/// result is a no-op. The first matched row supplies the locale.
pub fn strip_country_prefix(raw_name: &str) -> NameResolution {
    let mut name = raw_name.trim();
    let mut matched: Option<&'static CountryPrefix> = None;

    'strip: loop {
        for prefix in COUNTRY_PREFIXES {
            if let Some(remainder) = match_prefix(name, prefix.token) {
                matched.get_or_insert(prefix);
                name = remainder.trim();
                continue 'strip;
            }
        }
        break;
    }

    NameResolution {
        name: name.to_string(),
        country: matched.map(|prefix| prefix.country),
        language: matched.and_then(|prefix| prefix.language),
    }
}

/// Classify a track from its `group-title`.
///
/// Series markers are checked before movie markers; anything else, including
/// a blank label, is a live channel.
pub fn infer_media_kind(group_title: Option<&str>) -> MediaKind {
    let Some(group_title) = group_title.filter(|title| !title.trim().is_empty()) else {
        return MediaKind::LiveChannel;
    };

    let normalized = group_title.to_lowercase();

    if SERIES_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        return MediaKind::Series;
    }

    if MOVIE_MARKERS.iter().any(|marker| normalized.contains(marker)) {
        return MediaKind::Movie;
    }

    MediaKind::LiveChannel
}

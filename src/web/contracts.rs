//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::models::Track;
use crate::services::{CountrySummary, TrackGroup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistFromUrlRequest {
    pub url: String,
}

/// Returned after a playlist has been parsed and cached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummaryResponse {
    pub playlist_id: String,
    pub countries: Vec<CountrySummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDto {
    pub id: String,
    pub name: String,
    pub country_code: Option<String>,
    pub language_code: Option<String>,
    pub group_title: Option<String>,
    pub logo_url: Option<String>,
    pub stream_url: String,
    pub media_type: String,
}

impl From<&Track> for ChannelDto {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            country_code: track.country_code.clone(),
            language_code: track.language_code.clone(),
            group_title: track.group_title.clone(),
            logo_url: track.logo_url.clone(),
            stream_url: track.stream_url.clone(),
            media_type: track.media_kind.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSummary {
    pub code: String,
    pub channel_count: usize,
}

impl From<TrackGroup<'_>> for LanguageSummary {
    fn from(group: TrackGroup<'_>) -> Self {
        Self {
            channel_count: group.len(),
            code: group.key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attributes, MediaKind};

    #[test]
    fn test_channel_dto_serializes_camel_case() {
        let track = Track {
            id: "tf1.fr".to_string(),
            name: "TF1".to_string(),
            media_kind: MediaKind::LiveChannel,
            country_code: Some("FR".to_string()),
            language_code: Some("fr".to_string()),
            group_title: None,
            logo_url: None,
            stream_url: "http://example.test/tf1".to_string(),
            attributes: Attributes::new(),
        };

        let json = serde_json::to_value(ChannelDto::from(&track)).unwrap();
        assert_eq!(json["countryCode"], "FR");
        assert_eq!(json["streamUrl"], "http://example.test/tf1");
        assert_eq!(json["mediaType"], MediaKind::LiveChannel.as_str());
        assert!(json["logoUrl"].is_null());
    }
}

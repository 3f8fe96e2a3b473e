//! Remote playlist fetching.
//!
//! The response body is streamed straight into the parser, so a remote
//! playlist is never held in memory as a whole.

use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::{AppError, AppResult, ParseError, SourceError};
use crate::models::Playlist;
use crate::parser::M3uPlaylistParser;
use crate::utils::limited_stream::{limited_reader, payload_limit};

/// Downloads and parses playlists from HTTP(S) URLs.
#[derive(Clone)]
pub struct PlaylistFetcher {
    client: Client,
    parser: M3uPlaylistParser,
    max_bytes: u64,
}

impl PlaylistFetcher {
    /// Create a fetcher with a total request timeout and a body size cap.
    pub fn new(timeout: Duration, max_bytes: u64) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            parser: M3uPlaylistParser::new(),
            max_bytes,
        })
    }

    /// Check that `raw_url` is an absolute http or https URL.
    pub fn validate_url(raw_url: &str) -> Result<Url, SourceError> {
        let trimmed = raw_url.trim();
        if trimmed.is_empty() {
            return Err(SourceError::invalid_url(raw_url, "URL is required"));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| SourceError::invalid_url(trimmed, e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(SourceError::invalid_url(
                trimmed,
                format!("unsupported scheme '{scheme}', expected http or https"),
            )),
        }
    }

    /// Download `raw_url` and parse it as an Extended M3U playlist.
    pub async fn fetch(&self, raw_url: &str, cancel: &CancellationToken) -> AppResult<Playlist> {
        let url = Self::validate_url(raw_url)?;
        info!("Fetching remote playlist: {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::from(SourceError::timeout(url.as_str()))
            } else {
                warn!("Failed to connect to playlist source {}: {}", url, e);
                AppError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            }
            .into());
        }

        if let Some(length) = response.content_length() {
            debug!("Remote playlist {} declares {} bytes", url, length);
            if length > self.max_bytes {
                return Err(SourceError::TooLarge {
                    url: url.to_string(),
                    max_bytes: self.max_bytes,
                }
                .into());
            }
        }

        let mut reader = limited_reader(response.bytes_stream(), self.max_bytes);
        self.parser
            .parse(&mut reader, cancel)
            .await
            .map_err(|e| match e {
                ParseError::Io(io) if payload_limit(&io).is_some() => SourceError::TooLarge {
                    url: url.to_string(),
                    max_bytes: self.max_bytes,
                }
                .into(),
                ParseError::Io(io) => match transport_error(io) {
                    Ok(e) if e.is_timeout() => SourceError::timeout(url.as_str()).into(),
                    Ok(e) => {
                        warn!("Playlist source {} failed mid-body: {}", url, e);
                        AppError::Http(e)
                    }
                    Err(io) => AppError::Parse(ParseError::Io(io)),
                },
                other => AppError::Parse(other),
            })
    }
}

/// Recover the client error that broke a body stream, if that is what `io` wraps.
fn transport_error(io: std::io::Error) -> Result<reqwest::Error, std::io::Error> {
    if !io
        .get_ref()
        .is_some_and(|inner| inner.is::<reqwest::Error>())
    {
        return Err(io);
    }

    match io.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(e)) => Ok(*e),
        Some(Err(inner)) => Err(std::io::Error::other(inner)),
        None => Err(std::io::Error::other("stream error without source")),
    }
}

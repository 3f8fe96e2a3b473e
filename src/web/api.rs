//! HTTP handlers for playlist ingestion and catalogue queries.
//!
//! Handlers stay thin: ingestion goes through the parser or the fetcher, the
//! result is cached in the store, and every query endpoint reads a cached
//! playlist back and runs it through the grouping service.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::contracts::{
    ChannelDto, HealthResponse, LanguageSummary, PlaylistFromUrlRequest, PlaylistSummaryResponse,
};
use super::AppState;
use crate::errors::{AppError, AppResult, ParseError, WebError};
use crate::models::Playlist;
use crate::services::{group_by_language, live_channels_for_country, summarize_countries};
use crate::utils::limited_stream::{limited_reader, payload_limit};

const SERVICE_NAME: &str = "m3u-player";
const UPLOAD_FIELD: &str = "file";

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// Parse an uploaded playlist (multipart field `file`) and cache it.
pub async fn upload_playlist(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<PlaylistSummaryResponse>> {
    let max_bytes = state.config.playlist.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(WebError::from)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("playlist.m3u").to_string();
        debug!("Receiving playlist upload '{}'", file_name);

        let cancel = state.shutdown.child_token();
        let mut reader = limited_reader(field, max_bytes);
        let playlist = state
            .parser
            .parse(&mut reader, &cancel)
            .await
            .map_err(|e| match e {
                ParseError::Io(io) if payload_limit(&io).is_some() => {
                    AppError::from(WebError::PayloadTooLarge {
                        max_size: max_bytes,
                    })
                }
                other => AppError::Parse(other),
            })?;

        info!(
            "Uploaded playlist '{}' parsed with {} tracks",
            file_name,
            playlist.len()
        );
        return store_and_summarize(&state, playlist).await;
    }

    Err(WebError::invalid_request(UPLOAD_FIELD, "a playlist file is required").into())
}

/// Download a playlist from an http(s) URL and cache it.
pub async fn import_playlist_from_url(
    State(state): State<AppState>,
    Json(request): Json<PlaylistFromUrlRequest>,
) -> AppResult<Json<PlaylistSummaryResponse>> {
    let cancel = state.shutdown.child_token();
    let playlist = state.fetcher.fetch(&request.url, &cancel).await?;
    store_and_summarize(&state, playlist).await
}

pub async fn list_countries(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> AppResult<Json<PlaylistSummaryResponse>> {
    let playlist = load_playlist(&state, &playlist_id).await?;
    Ok(Json(summary_response(&playlist)))
}

/// Live channels of one country. Unknown codes yield an empty list.
pub async fn list_country_channels(
    State(state): State<AppState>,
    Path((playlist_id, country_code)): Path<(String, String)>,
) -> AppResult<Json<Vec<ChannelDto>>> {
    let playlist = load_playlist(&state, &playlist_id).await?;
    let channels = live_channels_for_country(&playlist, &country_code)
        .into_iter()
        .map(ChannelDto::from)
        .collect();

    Ok(Json(channels))
}

pub async fn list_languages(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> AppResult<Json<Vec<LanguageSummary>>> {
    let playlist = load_playlist(&state, &playlist_id).await?;
    let languages = group_by_language(&playlist)
        .into_iter()
        .map(LanguageSummary::from)
        .collect();

    Ok(Json(languages))
}

/// Movies and series, in playlist order.
pub async fn list_vod(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> AppResult<Json<Vec<ChannelDto>>> {
    let playlist = load_playlist(&state, &playlist_id).await?;
    let items = playlist
        .tracks
        .iter()
        .filter(|track| track.media_kind.is_vod())
        .map(ChannelDto::from)
        .collect();

    Ok(Json(items))
}

async fn load_playlist(state: &AppState, playlist_id: &str) -> AppResult<Arc<Playlist>> {
    state
        .store
        .get(playlist_id)
        .await?
        .ok_or_else(|| AppError::not_found("Playlist", playlist_id))
}

async fn store_and_summarize(
    state: &AppState,
    playlist: Playlist,
) -> AppResult<Json<PlaylistSummaryResponse>> {
    let stored = state.store.save(playlist).await?;
    info!("Playlist {} cached with {} tracks", stored.id, stored.len());
    Ok(Json(summary_response(&stored)))
}

fn summary_response(playlist: &Playlist) -> PlaylistSummaryResponse {
    PlaylistSummaryResponse {
        playlist_id: playlist.id.clone(),
        countries: summarize_countries(playlist),
    }
}

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use m3u_player::{
    config::Config,
    services::InMemoryPlaylistStore,
    web::{AppState, WebServer},
};

const PLAYLIST_WITH_VOD: &str = concat!(
    "#EXTM3U\n",
    "#EXTINF:-1 tvg-id=\"live-1\" tvg-country=\"FR\",Live News\n",
    "http://test/live1.m3u8\n",
    "#EXTINF:-1 tvg-id=\"vod-1\" tvg-country=\"FR\" group-title=\"VOD Movies\",Movie One\n",
    "http://test/movie1.m3u8\n",
    "#EXTINF:-1 tvg-id=\"series-1\" tvg-country=\"FR\" group-title=\"Series FR\",Series One\n",
    "http://test/series1.m3u8\n",
    "#EXTINF:-1 tvg-id=\"live-2\" tvg-country=\"FR\",Live Sport\n",
    "http://test/live2.m3u8\n",
);

const BOUNDARY: &str = "m3u-player-test-boundary";

fn test_app_with(config: Config) -> Router {
    let store = Arc::new(InMemoryPlaylistStore::new(config.playlist.cache_ttl()));
    let state = AppState::new(config, store, CancellationToken::new()).unwrap();
    WebServer::create_router(state)
}

fn test_app() -> Router {
    test_app_with(Config::default())
}

fn multipart_body(field_name: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field_name}\"; filename=\"playlist.m3u\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

// Helper function to send requests to the app
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

async fn send_request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request_builder = Request::builder().method(method).uri(uri);

    let request = if let Some(body) = body {
        request_builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        request_builder.body(Body::empty()).unwrap()
    };

    send(app, request).await
}

async fn upload(app: &Router, field_name: &str, content: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/playlists/from-file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field_name, content)))
        .unwrap();

    send(app, request).await
}

async fn upload_playlist(app: &Router) -> String {
    let (status, summary) = upload(app, "file", PLAYLIST_WITH_VOD).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {summary}");
    summary["playlistId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let (status, response) = send_request(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "OK");
    assert_eq!(response["service"], "m3u-player");
}

#[tokio::test]
async fn test_countries_count_only_live_channels() {
    let app = test_app();
    let (status, posted) = upload(&app, "file", PLAYLIST_WITH_VOD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(posted["countries"].as_array().unwrap().len(), 1);
    assert_eq!(posted["countries"][0]["code"], "FR");
    assert_eq!(posted["countries"][0]["channelCount"], 2);

    let playlist_id = posted["playlistId"].as_str().unwrap();
    let (status, fetched) = send_request(
        &app,
        Method::GET,
        &format!("/api/playlists/{playlist_id}/countries"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["playlistId"], playlist_id);
    assert_eq!(fetched["countries"], posted["countries"]);
}

#[tokio::test]
async fn test_channels_by_country_returns_only_live_channels() {
    let app = test_app();
    let playlist_id = upload_playlist(&app).await;

    for code in ["FR", "fr"] {
        let (status, channels) = send_request(
            &app,
            Method::GET,
            &format!("/api/playlists/{playlist_id}/countries/{code}/channels"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let channels = channels.as_array().unwrap();
        assert_eq!(channels.len(), 2);
        assert!(channels.iter().all(|c| c["mediaType"] == "LiveChannel"));
        assert_eq!(channels[0]["id"], "live-1");
        assert_eq!(channels[1]["streamUrl"], "http://test/live2.m3u8");
    }
}

#[tokio::test]
async fn test_unknown_country_yields_empty_list() {
    let app = test_app();
    let playlist_id = upload_playlist(&app).await;

    let (status, channels) = send_request(
        &app,
        Method::GET,
        &format!("/api/playlists/{playlist_id}/countries/DE/channels"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(channels, json!([]));
}

#[tokio::test]
async fn test_vod_endpoint_exposes_movies_and_series_only() {
    let app = test_app();
    let playlist_id = upload_playlist(&app).await;

    let (status, items) = send_request(
        &app,
        Method::GET,
        &format!("/api/playlists/{playlist_id}/vod"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["mediaType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Movie", "Series"]);
}

#[tokio::test]
async fn test_languages_group_all_tracks() {
    let app = test_app();
    let content = concat!(
        "#EXTM3U\n",
        "#EXTINF:-1 tvg-id=\"a\" tvg-language=\"FR\",A\n",
        "http://test/a\n",
        "#EXTINF:-1 tvg-id=\"b\" group-title=\"Movies\",B\n",
        "http://test/b\n",
        "#EXTINF:-1 tvg-id=\"c\" tvg-language=\"fr\",C\n",
        "http://test/c\n",
    );
    let (_, summary) = upload(&app, "file", content).await;
    let playlist_id = summary["playlistId"].as_str().unwrap();

    let (status, languages) = send_request(
        &app,
        Method::GET,
        &format!("/api/playlists/{playlist_id}/languages"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        languages,
        json!([
            { "code": "fr", "channelCount": 2 },
            { "code": "UNSPECIFIED", "channelCount": 1 },
        ])
    );
}

#[tokio::test]
async fn test_unknown_playlist_returns_not_found() {
    let app = test_app();

    for path in ["countries", "countries/FR/channels", "languages", "vod"] {
        let (status, response) = send_request(
            &app,
            Method::GET,
            &format!("/api/playlists/does-not-exist/{path}"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().contains("does-not-exist"));
    }
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = test_app();

    let (status, response) = upload(&app, "attachment", PLAYLIST_WITH_VOD).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = Config::default();
    config.playlist.max_upload_bytes = 64;
    let app = test_app_with(config);

    let (status, response) = upload(&app, "file", PLAYLIST_WITH_VOD).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["success"], false);
}

#[tokio::test]
async fn test_empty_upload_yields_empty_summary() {
    let app = test_app();

    let (status, summary) = upload(&app, "file", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["countries"], json!([]));
    assert!(!summary["playlistId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_from_url_rejects_unsupported_scheme() {
    let app = test_app();

    let (status, response) = send_request(
        &app,
        Method::POST,
        "/api/playlists/from-url",
        Some(json!({ "url": "ftp://example.test/list.m3u" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
}

#[tokio::test]
async fn test_each_upload_gets_its_own_id() {
    let app = test_app();

    let first = upload_playlist(&app).await;
    let second = upload_playlist(&app).await;

    assert_ne!(first, second);
}

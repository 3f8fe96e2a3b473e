//! Web layer module
//!
//! This module provides the HTTP interface of the playlist service. Handlers
//! are thin and delegate to the parser, the fetcher, the playlist store and
//! the grouping service.
//!
//! # Architecture
//!
//! - **api**: request handlers
//! - **contracts**: request and response bodies
//! - **responses**: error envelope and status mapping

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    errors::AppResult,
    parser::M3uPlaylistParser,
    services::{PlaylistFetcher, PlaylistStore},
};

pub mod api;
pub mod contracts;
pub mod responses;

pub use responses::{handle_error, ErrorResponse};

/// Headroom above the playlist limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl WebServer {
    /// Create a new web server backed by `store`.
    ///
    /// Cancelling `shutdown` stops in-flight parses and the server itself.
    pub fn new(
        config: Config,
        store: Arc<dyn PlaylistStore>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let state = AppState::new(config, store, shutdown.clone())?;
        let app = Self::create_router(state);

        Ok(Self {
            app,
            addr,
            shutdown,
        })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        let body_limit = state
            .config
            .playlist
            .max_upload_bytes
            .saturating_add(MULTIPART_OVERHEAD_BYTES);
        let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

        Router::new()
            .nest("/api", Self::api_routes())
            // Middleware (applied in reverse order)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    fn api_routes() -> Router<AppState> {
        Router::new()
            .route("/health", get(api::health_check))
            // Ingestion
            .route("/playlists/from-file", post(api::upload_playlist))
            .route("/playlists/from-url", post(api::import_playlist_from_url))
            // Catalogue queries
            .route("/playlists/:id/countries", get(api::list_countries))
            .route(
                "/playlists/:id/countries/:code/channels",
                get(api::list_country_channels),
            )
            .route("/playlists/:id/languages", get(api::list_languages))
            .route("/playlists/:id/vod", get(api::list_vod))
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Web server listening on http://{}", self.addr);

        let shutdown = self.shutdown;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Web server stopped");
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub parser: M3uPlaylistParser,
    pub fetcher: PlaylistFetcher,
    pub store: Arc<dyn PlaylistStore>,
    /// Parent of the per-request cancellation tokens.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn PlaylistStore>,
        shutdown: CancellationToken,
    ) -> AppResult<Self> {
        let fetcher = PlaylistFetcher::new(
            config.playlist.fetch_timeout(),
            config.playlist.max_upload_bytes,
        )?;

        Ok(Self {
            config,
            parser: M3uPlaylistParser::new(),
            fetcher,
            store,
            shutdown,
        })
    }
}

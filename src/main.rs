use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_player::{
    config::Config,
    parser::M3uPlaylistParser,
    services::{group_by_language, summarize_countries, InMemoryPlaylistStore},
    web::{contracts::LanguageSummary, WebServer},
};

#[derive(Parser)]
#[command(name = "m3u-player")]
#[command(version = "0.1.0")]
#[command(about = "Extended M3U playlist parser and IPTV channel catalogue service")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a local playlist file and print a JSON summary
    Inspect {
        /// Playlist file to parse
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("m3u_player={},tower_http=trace", cli.log_level)
    } else {
        format!("m3u_player={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(Command::Inspect { file }) = cli.command {
        return inspect(&file).await;
    }

    info!("Starting M3U Player Service v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let shutdown = CancellationToken::new();

    let store = InMemoryPlaylistStore::new(config.playlist.cache_ttl());
    let eviction = store.spawn_eviction_task(config.playlist.eviction_interval(), shutdown.clone());
    info!(
        "Playlist cache initialized (ttl {}s, sweep every {}s)",
        config.playlist.cache_ttl_secs, config.playlist.eviction_interval_secs
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    let web_server = WebServer::new(config, Arc::new(store), shutdown.clone())?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    let result = web_server.serve().await;

    shutdown.cancel();
    if let Err(e) = eviction.await {
        warn!("Playlist eviction task ended abnormally: {}", e);
    }

    result
}

async fn inspect(path: &Path) -> Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open playlist {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let playlist = M3uPlaylistParser::new()
        .parse(&mut reader, &CancellationToken::new())
        .await
        .with_context(|| format!("Failed to parse playlist {}", path.display()))?;

    let languages: Vec<LanguageSummary> = group_by_language(&playlist)
        .into_iter()
        .map(LanguageSummary::from)
        .collect();

    let summary = serde_json::json!({
        "trackCount": playlist.len(),
        "vodCount": playlist.tracks.iter().filter(|t| t.media_kind.is_vod()).count(),
        "countries": summarize_countries(&playlist),
        "languages": languages,
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

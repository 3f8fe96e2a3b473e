use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::AppResult;

/// Prefix for environment overrides, e.g. `M3U_PLAYER__WEB__PORT=9000`.
pub const ENV_PREFIX: &str = "M3U_PLAYER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// How long a parsed playlist stays addressable.
    pub cache_ttl_secs: u64,
    /// Interval between sweeps of expired playlists.
    pub eviction_interval_secs: u64,
    /// Upper bound for uploaded and downloaded playlists.
    pub max_upload_bytes: u64,
    /// Total timeout for remote playlist downloads.
    pub fetch_timeout_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30 * 60,
            eviction_interval_secs: 60,
            max_upload_bytes: 100 * 1024 * 1024,
            fetch_timeout_secs: 60,
        }
    }
}

impl PlaylistConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    /// Layer defaults, the optional TOML file at `path`, then environment variables.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

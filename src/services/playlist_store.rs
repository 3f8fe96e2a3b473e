//! Time-bounded in-memory cache of parsed playlists.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::Playlist;

/// Storage for parsed playlists, addressed by generated identifiers.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Store a playlist under a fresh identifier and return the stored copy.
    async fn save(&self, playlist: Playlist) -> AppResult<Arc<Playlist>>;

    /// Fetch a playlist if it is still available.
    async fn get(&self, playlist_id: &str) -> AppResult<Option<Arc<Playlist>>>;
}

#[derive(Debug)]
struct CachedPlaylist {
    playlist: Arc<Playlist>,
    expires_at: Instant,
}

/// [`PlaylistStore`] keeping playlists in memory for a fixed time-to-live.
///
/// Expired entries are invisible to readers immediately and are physically
/// removed by [`InMemoryPlaylistStore::evict_expired`], which
/// [`InMemoryPlaylistStore::spawn_eviction_task`] runs periodically.
#[derive(Clone)]
pub struct InMemoryPlaylistStore {
    entries: Arc<RwLock<HashMap<String, CachedPlaylist>>>,
    ttl: Duration,
}

impl InMemoryPlaylistStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove expired entries, returning how many were dropped.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|playlist_id, cached| {
            let keep = cached.expires_at > now;
            if !keep {
                debug!("Playlist {} evicted from memory (expired)", playlist_id);
            }
            keep
        });

        before - entries.len()
    }

    /// Sweep expired entries every `interval` until `cancel` fires.
    pub fn spawn_eviction_task(
        &self,
        interval: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Playlist eviction task stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = store.evict_expired().await;
                        if evicted > 0 {
                            debug!("Evicted {} expired playlists", evicted);
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylistStore {
    async fn save(&self, playlist: Playlist) -> AppResult<Arc<Playlist>> {
        let playlist_id = Uuid::new_v4().simple().to_string();
        let playlist = Arc::new(playlist.with_id(playlist_id.clone()));

        self.entries.write().await.insert(
            playlist_id.clone(),
            CachedPlaylist {
                playlist: Arc::clone(&playlist),
                expires_at: Instant::now() + self.ttl,
            },
        );

        debug!(
            "Stored playlist {} ({} tracks, ttl {:?})",
            playlist_id,
            playlist.tracks.len(),
            self.ttl
        );
        Ok(playlist)
    }

    async fn get(&self, playlist_id: &str) -> AppResult<Option<Arc<Playlist>>> {
        if playlist_id.trim().is_empty() {
            return Err(AppError::validation("Playlist identifier is required"));
        }

        let entries = self.entries.read().await;
        Ok(entries
            .get(playlist_id)
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| Arc::clone(&cached.playlist)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_PLAYLIST_ID;

    fn playlist() -> Playlist {
        crate::parser::M3uPlaylistParser::new()
            .parse_str("#EXTM3U\n#EXTINF:-1 tvg-id=\"a\",A\nhttp://stream.test/a\n")
    }

    #[tokio::test]
    async fn test_save_assigns_fresh_identifier() {
        let store = InMemoryPlaylistStore::new(Duration::from_secs(60));

        let first = store.save(playlist()).await.unwrap();
        let second = store.save(playlist()).await.unwrap();

        assert_ne!(first.id, DEFAULT_PLAYLIST_ID);
        assert_eq!(first.id.len(), 32);
        assert_ne!(first.id, second.id);

        let fetched = store.get(&first.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, first.id);
        assert_eq!(fetched.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_absent() {
        let store = InMemoryPlaylistStore::new(Duration::from_secs(60));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_identifier_is_rejected() {
        let store = InMemoryPlaylistStore::new(Duration::from_secs(60));
        let result = store.get("  ").await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let store = InMemoryPlaylistStore::new(Duration::from_secs(30));
        let saved = store.save(playlist()).await.unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(store.get(&saved.id).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get(&saved.id).await.unwrap().is_none());
        assert_eq!(store.len().await, 1);

        assert_eq!(store.evict_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_task_sweeps_and_stops() {
        let store = InMemoryPlaylistStore::new(Duration::from_secs(5));
        store.save(playlist()).await.unwrap();

        let cancel = CancellationToken::new();
        let handle = store.spawn_eviction_task(Duration::from_secs(1), cancel.clone());

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(store.is_empty().await);

        cancel.cancel();
        handle.await.unwrap();
    }
}

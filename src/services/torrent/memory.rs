//! In-memory torrent service for tests and dry runs.
//!
//! State is not persisted across restarts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::backend::{StoreError, StoreResult, TorrentService};
use crate::models::{Media, MediaKind, Torrent};

#[derive(Debug, Default)]
struct Inner {
    media: HashMap<String, Media>,
    torrents: HashMap<(String, String), Torrent>,
    next_media_id: i32,
    next_torrent_id: i32,
}

/// Lock-based store keeping catalog and torrents in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTorrentService {
    inner: RwLock<Inner>,
}

impl InMemoryTorrentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog entry and return it.
    pub async fn add_media(&self, imdb_id: &str, kind: MediaKind, title: &str) -> Media {
        let mut inner = self.inner.write().await;
        inner.next_media_id += 1;
        let media = Media {
            id: inner.next_media_id,
            imdb_id: imdb_id.to_string(),
            kind,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        inner.media.insert(imdb_id.to_string(), media.clone());
        media
    }

    pub async fn get_torrent(&self, provider: &str, topic_id: &str) -> Option<Torrent> {
        let inner = self.inner.read().await;
        inner
            .torrents
            .get(&(provider.to_string(), topic_id.to_string()))
            .cloned()
    }

    /// All stored torrents, ordered by topic id.
    pub async fn torrents(&self) -> Vec<Torrent> {
        let inner = self.inner.read().await;
        let mut torrents: Vec<Torrent> = inner.torrents.values().cloned().collect();
        torrents.sort_by(|a, b| a.topic_id.cmp(&b.topic_id));
        torrents
    }
}

#[async_trait]
impl TorrentService for InMemoryTorrentService {
    async fn find_media_by_imdb(&self, imdb_id: &str) -> StoreResult<Option<Media>> {
        Ok(self.inner.read().await.media.get(imdb_id).cloned())
    }

    async fn find_or_create_torrent(
        &self,
        provider: &str,
        topic_id: &str,
        template: Torrent,
    ) -> StoreResult<Torrent> {
        // Held across lookup and insert so racing callers see one row.
        let mut inner = self.inner.write().await;
        let key = (provider.to_string(), topic_id.to_string());
        if let Some(existing) = inner.torrents.get(&key) {
            return Ok(existing.clone());
        }

        inner.next_torrent_id += 1;
        let torrent = Torrent {
            id: Some(inner.next_torrent_id),
            provider: provider.to_string(),
            topic_id: topic_id.to_string(),
            ..template
        };
        inner.torrents.insert(key, torrent.clone());
        Ok(torrent)
    }

    async fn update_torrent(&self, torrent: &Torrent) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let key = (torrent.provider.clone(), torrent.topic_id.clone());
        match inner.torrents.get_mut(&key) {
            Some(stored) => {
                let media_id = stored.media_id;
                *stored = Torrent {
                    media_id,
                    updated_at: Utc::now(),
                    ..torrent.clone()
                };
                Ok(())
            }
            None => Err(StoreError::NotFound {
                provider: torrent.provider.clone(),
                topic_id: torrent.topic_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_find_or_create_returns_existing() {
        let store = InMemoryTorrentService::new();
        let media = store.add_media("tt001", MediaKind::Movie, "A").await;

        let mut first = store
            .find_or_create_torrent("yts", "1:abc", Torrent::template(media.id))
            .await
            .unwrap();
        first.seed = 9;
        store.update_torrent(&first).await.unwrap();

        let again = store
            .find_or_create_torrent("yts", "1:abc", Torrent::template(999))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.seed, 9);
        assert_eq!(again.media_id, media.id);
    }

    #[tokio::test]
    async fn test_update_keeps_media_association() {
        let store = InMemoryTorrentService::new();
        let media = store.add_media("tt001", MediaKind::Movie, "A").await;
        let mut torrent = store
            .find_or_create_torrent("yts", "1:abc", Torrent::template(media.id))
            .await
            .unwrap();
        torrent.media_id = 12345;
        store.update_torrent(&torrent).await.unwrap();

        let stored = store.get_torrent("yts", "1:abc").await.unwrap();
        assert_eq!(stored.media_id, media.id);
    }

    #[tokio::test]
    async fn test_update_unknown_torrent_fails() {
        let store = InMemoryTorrentService::new();
        let mut torrent = Torrent::template(1);
        torrent.provider = "yts".into();
        torrent.topic_id = "1:zzz".into();
        let err = store.update_torrent(&torrent).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_single_row() {
        let store = Arc::new(InMemoryTorrentService::new());
        let media = store.add_media("tt001", MediaKind::Movie, "A").await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .find_or_create_torrent("yts", "1:abc", Torrent::template(media.id))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.torrents().await.len(), 1);
    }
}

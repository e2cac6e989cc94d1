//! SQLite-backed torrent service.

use async_trait::async_trait;

use super::backend::{StoreError, StoreResult, TorrentService};
use crate::models::{Media, Torrent};
use crate::repository::{DbContext, DieselMediaRepository, DieselTorrentRepository};

/// Torrent service over the Diesel repositories.
#[derive(Clone)]
pub struct DieselTorrentService {
    media: DieselMediaRepository,
    torrents: DieselTorrentRepository,
}

impl DieselTorrentService {
    pub fn new(ctx: &DbContext) -> Self {
        Self {
            media: ctx.media(),
            torrents: ctx.torrents(),
        }
    }
}

#[async_trait]
impl TorrentService for DieselTorrentService {
    async fn find_media_by_imdb(&self, imdb_id: &str) -> StoreResult<Option<Media>> {
        Ok(self.media.get_by_imdb(imdb_id).await?)
    }

    async fn find_or_create_torrent(
        &self,
        provider: &str,
        topic_id: &str,
        template: Torrent,
    ) -> StoreResult<Torrent> {
        Ok(self
            .torrents
            .find_or_create(provider, topic_id, &template)
            .await?)
    }

    async fn update_torrent(&self, torrent: &Torrent) -> StoreResult<()> {
        if self.torrents.update(torrent).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                provider: torrent.provider.clone(),
                topic_id: torrent.topic_id.clone(),
            })
        }
    }
}

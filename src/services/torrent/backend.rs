//! Pluggable persistence trait used by spiders.
//!
//! Allows swapping between the SQLite-backed store and an in-memory store
//! (tests and dry runs).

use async_trait::async_trait;

use crate::models::{Media, Torrent};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Torrent not found: {provider}/{topic_id}")]
    NotFound { provider: String, topic_id: String },
}

/// Catalog lookup and torrent persistence for spiders.
///
/// Implementations must hold at most one torrent per `(provider, topic_id)`
/// even when `find_or_create_torrent` races with itself.
#[async_trait]
pub trait TorrentService: Send + Sync {
    /// Resolve a catalog entry by IMDb code.
    async fn find_media_by_imdb(&self, imdb_id: &str) -> StoreResult<Option<Media>>;

    /// Return the torrent stored under `(provider, topic_id)`, creating it
    /// from `template` if absent. The template's media is only applied on
    /// creation.
    async fn find_or_create_torrent(
        &self,
        provider: &str,
        topic_id: &str,
        template: Torrent,
    ) -> StoreResult<Torrent>;

    /// Persist the mutable fields of an existing torrent.
    async fn update_torrent(&self, torrent: &Torrent) -> StoreResult<()>;
}

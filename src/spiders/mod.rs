//! Spider implementations for external torrent catalogs.
//!
//! Every source implements [`Spider`]; the scheduler drives spiders through
//! a [`SpiderRegistry`] without knowing their concrete types.

pub mod ranking;
mod registry;
pub mod yts;

pub use registry::SpiderRegistry;
pub use yts::Yts;

use async_trait::async_trait;

use crate::http_client::HttpError;
use crate::models::{ForumCursor, Torrent, TopicRef};
use crate::services::StoreError;

/// Errors raised while crawling a source.
#[derive(Debug, thiserror::Error)]
pub enum SpiderError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A crawlable torrent source.
#[async_trait]
pub trait Spider: Send + Sync {
    /// Stable provider name; also the provider key of stored torrents.
    fn name(&self) -> &'static str;

    /// Listings ("forums") this spider pages through.
    fn forum_keys(&self) -> Vec<u32>;

    /// Fetch and process one listing page.
    ///
    /// Returns the cursor of the next page to fetch, or `None` when the
    /// listing should go idle until it is re-triggered.
    async fn get_page(&self, forum: &ForumCursor) -> Result<Option<ForumCursor>, SpiderError>;

    /// Refresh the torrents behind a single topic.
    async fn get_topic(&self, topic: &TopicRef) -> Result<(), SpiderError>;

    /// Crawl priority of a stored torrent. Higher is sooner.
    fn priority(&self, torrent: &Torrent) -> i32 {
        ranking::default_priority(torrent)
    }
}

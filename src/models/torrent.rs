//! Torrent records reconciled from crawled catalog pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A locally persisted torrent.
///
/// Identified by `(provider, topic_id)`. The topic id is derived from the
/// remote record and never changes once the row exists; every other
/// descriptive field is overwritten whenever the source is crawled again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torrent {
    /// Row id, `None` until the torrent has been persisted.
    pub id: Option<i32>,
    /// Name of the spider that owns this torrent.
    pub provider: String,
    /// Composite key unique within the provider.
    pub topic_id: String,
    /// Catalog entry this torrent belongs to. Set only on creation.
    pub media_id: i32,
    pub provider_title: String,
    /// Magnet URI.
    pub url: String,
    pub seed: i32,
    pub peer: i32,
    pub quality: String,
    pub language: String,
    /// Payload size in bytes.
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Torrent {
    /// Blank torrent bound to a catalog entry, used as the creation
    /// template for find-or-create lookups.
    pub fn template(media_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            provider: String::new(),
            topic_id: String::new(),
            media_id,
            provider_title: String::new(),
            url: String::new(),
            seed: 0,
            peer: 0,
            quality: String::new(),
            language: String::new(),
            size: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

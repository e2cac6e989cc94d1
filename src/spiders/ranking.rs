//! Baseline crawl ranking shared by all spiders.

use crate::models::Torrent;

/// Priority of a torrent when no spider-specific rule applies.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Baseline priority for a torrent. Higher is crawled sooner.
pub fn default_priority(_torrent: &Torrent) -> i32 {
    DEFAULT_PRIORITY
}

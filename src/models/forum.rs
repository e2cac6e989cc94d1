//! Crawl cursors and topic references exchanged with the scheduler.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted watermark, in hours (about a century).
pub const MAX_LAST_HOURS: u32 = 24 * 366 * 100;

/// Position of a spider inside one paginated listing ("forum").
///
/// `last` is the watermark in hours: only items uploaded within the last
/// `last` hours count as new. `None` means no watermark, which is distinct
/// from `Some(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumCursor {
    pub id: u32,
    pub page: u32,
    pub last: Option<u32>,
    /// Advised wait before fetching this cursor, in seconds.
    pub delay: u64,
}

impl ForumCursor {
    pub fn new(id: u32, page: u32, last: Option<u32>) -> Self {
        Self {
            id,
            page: page.max(1),
            last,
            delay: 0,
        }
    }

    /// Cursor for the following page, keeping the watermark.
    pub fn next(&self, delay: u64) -> Self {
        Self {
            id: self.id,
            page: self.page + 1,
            last: self.last,
            delay,
        }
    }

    /// Upload time after which items count as new, if a watermark is set.
    ///
    /// A watermark reaching past the representable range has no lower bound.
    pub fn after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.last.map(|hours| {
            Duration::try_hours(i64::from(hours))
                .and_then(|span| now.checked_sub_signed(span))
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        })
    }
}

/// Reference to a single remote topic, as `<container id>:<variant hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    pub id: String,
}

impl TopicRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The remote container id, i.e. everything before the first `:`.
    pub fn container_id(&self) -> &str {
        self.id.split(':').next().unwrap_or_default()
    }
}

/// Scheduler bookkeeping for one `(spider, forum)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumState {
    pub spider: String,
    pub forum_id: u32,
    pub page: u32,
    pub last_hours: Option<u32>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ForumState {
    /// Fresh state starting at the first page.
    pub fn new(spider: &str, forum_id: u32, last_hours: Option<u32>) -> Self {
        Self {
            spider: spider.to_string(),
            forum_id,
            page: 1,
            last_hours,
            next_run_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn cursor(&self) -> ForumCursor {
        ForumCursor::new(self.forum_id, self.page, self.last_hours)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run_at.is_none_or(|at| at <= now)
    }
}

//! Data models for seedwatch.

mod forum;
mod media;
mod torrent;

pub use forum::{ForumCursor, ForumState, TopicRef, MAX_LAST_HOURS};
pub use media::{Media, MediaKind};
pub use torrent::Torrent;

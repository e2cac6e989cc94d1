//! Catalog lookup and torrent persistence.

mod backend;
mod memory;
mod sqlite;

pub use backend::{StoreError, StoreResult, TorrentService};
pub use memory::InMemoryTorrentService;
pub use sqlite::DieselTorrentService;

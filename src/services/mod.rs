//! Service layer consumed by spiders.
//!
//! Spiders only talk to persistence through these traits so that the
//! crawl logic can run against SQLite or an in-memory store.

pub mod torrent;

pub use torrent::{
    DieselTorrentService, InMemoryTorrentService, StoreError, StoreResult, TorrentService,
};

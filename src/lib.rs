//! seedwatch - incremental torrent catalog crawler.
//!
//! Spiders page through remote catalogs, stop once a page holds nothing new,
//! and reconcile every torrent they see into a local SQLite store.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod config;
pub mod http_client;
pub mod models;
pub mod repository;
pub mod runner;
pub mod schema;
pub mod services;
pub mod spiders;

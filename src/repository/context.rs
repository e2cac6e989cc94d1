//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection pool and hands out repositories.

use std::path::Path;

use super::forum_state::DieselForumStateRepository;
use super::media::DieselMediaRepository;
use super::migrations::run_migrations;
use super::pool::{AsyncSqlitePool, DieselError};
use super::torrent::DieselTorrentRepository;

/// Database context that manages the connection pool and provides repository access.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:seedwatch.db");
/// let torrents = ctx.torrents().list(None, 20).await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a context from a database URL (`sqlite:` prefix optional).
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Create a context from a SQLite file path.
    pub fn from_sqlite_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Apply pending schema migrations.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        run_migrations(self.pool.database_url()).await
    }

    /// Get a media (catalog) repository.
    pub fn media(&self) -> DieselMediaRepository {
        DieselMediaRepository::new(self.pool.clone())
    }

    /// Get a torrent repository.
    pub fn torrents(&self) -> DieselTorrentRepository {
        DieselTorrentRepository::new(self.pool.clone())
    }

    /// Get a forum state repository.
    pub fn forum_state(&self) -> DieselForumStateRepository {
        DieselForumStateRepository::new(self.pool.clone())
    }
}

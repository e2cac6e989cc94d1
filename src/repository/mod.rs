//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against a SQLite backend.

pub mod context;
pub mod forum_state;
pub mod media;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod torrent;
pub mod util;

pub use context::DbContext;
pub use forum_state::DieselForumStateRepository;
pub use media::DieselMediaRepository;
pub use pool::{AsyncSqlitePool, DieselError};
pub use torrent::DieselTorrentRepository;
pub use util::{parse_datetime, parse_datetime_opt};

#[cfg(test)]
pub(crate) mod test_support {
    use super::migrations::run_migrations;
    use super::pool::AsyncSqlitePool;
    use tempfile::{tempdir, TempDir};

    /// Fresh migrated database in a temporary directory.
    pub async fn setup_test_db() -> (AsyncSqlitePool, TempDir) {
        let dir = tempdir().unwrap();
        let db_url = dir.path().join("test.db").display().to_string();
        run_migrations(&db_url).await.unwrap();
        (AsyncSqlitePool::new(&db_url), dir)
    }
}

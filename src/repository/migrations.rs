//! Schema migrations embedded from `migrations/sqlite`.

use diesel::{Connection, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

use super::pool::DieselError;
use super::util::to_diesel_error;

pub const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");

/// Apply every pending migration on a blocking connection, returning the
/// versions applied.
fn apply_pending(path: &str) -> Result<Vec<String>, DieselError> {
    let mut conn = SqliteConnection::establish(path).map_err(to_diesel_error)?;
    let applied = conn
        .run_pending_migrations(SQLITE_MIGRATIONS)
        .map_err(DieselError::QueryBuilderError)?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Bring the database at `database_url` (`sqlite:` prefix optional) up to
/// the latest schema.
pub async fn run_migrations(database_url: &str) -> Result<(), DieselError> {
    let path = database_url
        .strip_prefix("sqlite:")
        .unwrap_or(database_url)
        .to_string();

    let applied = tokio::task::spawn_blocking(move || apply_pending(&path))
        .await
        .map_err(to_diesel_error)??;

    if !applied.is_empty() {
        info!("Applied {} migration(s): {}", applied.len(), applied.join(", "));
    }
    Ok(())
}

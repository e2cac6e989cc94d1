//! Diesel-based catalog (media) repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{MediaRecord, NewMedia};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::parse_datetime;
use crate::models::{Media, MediaKind};
use crate::schema::media;

/// Convert a database record to a domain model.
impl TryFrom<MediaRecord> for Media {
    type Error = DieselError;

    fn try_from(record: MediaRecord) -> Result<Self, Self::Error> {
        Ok(Media {
            id: record.id,
            kind: MediaKind::from_str(&record.kind).ok_or_else(|| {
                DieselError::DeserializationError(
                    format!("Invalid media kind: '{}'", record.kind).into(),
                )
            })?,
            imdb_id: record.imdb_id,
            title: record.title,
            created_at: parse_datetime(&record.created_at),
        })
    }
}

/// Diesel-based media repository.
#[derive(Clone)]
pub struct DieselMediaRepository {
    pool: AsyncSqlitePool,
}

impl DieselMediaRepository {
    /// Create a new repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a catalog entry by IMDb code.
    pub async fn get_by_imdb(&self, imdb_id: &str) -> Result<Option<Media>, DieselError> {
        let mut conn = self.pool.get().await?;

        media::table
            .filter(media::imdb_id.eq(imdb_id))
            .select(MediaRecord::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .map(Media::try_from)
            .transpose()
    }

    /// Add a catalog entry, or update the title and kind of an existing one.
    pub async fn upsert(
        &self,
        imdb_id: &str,
        kind: MediaKind,
        title: &str,
    ) -> Result<Media, DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = Utc::now().to_rfc3339();

        diesel::insert_into(media::table)
            .values(&NewMedia {
                imdb_id,
                kind: kind.as_str(),
                title,
                created_at: &created_at,
            })
            .on_conflict(media::imdb_id)
            .do_update()
            .set((media::kind.eq(kind.as_str()), media::title.eq(title)))
            .execute(&mut conn)
            .await?;

        media::table
            .filter(media::imdb_id.eq(imdb_id))
            .select(MediaRecord::as_select())
            .first(&mut conn)
            .await
            .and_then(Media::try_from)
    }

    /// List all catalog entries ordered by id.
    pub async fn get_all(&self) -> Result<Vec<Media>, DieselError> {
        let mut conn = self.pool.get().await?;

        media::table
            .order(media::id.asc())
            .select(MediaRecord::as_select())
            .load(&mut conn)
            .await?
            .into_iter()
            .map(Media::try_from)
            .collect()
    }
}

//! Diesel-based torrent repository.
//!
//! Torrents are unique per `(provider, topic_id)`; the unique index on that
//! pair is what keeps concurrent find-or-create calls from producing
//! duplicate rows.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewTorrent, TorrentRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::parse_datetime;
use crate::models::Torrent;
use crate::schema::torrents;

/// Convert a database record to a domain model.
impl From<TorrentRecord> for Torrent {
    fn from(record: TorrentRecord) -> Self {
        Torrent {
            id: Some(record.id),
            provider: record.provider,
            topic_id: record.topic_id,
            media_id: record.media_id,
            provider_title: record.provider_title,
            url: record.url,
            seed: record.seed,
            peer: record.peer,
            quality: record.quality,
            language: record.language,
            size: record.size,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Diesel-based torrent repository.
#[derive(Clone)]
pub struct DieselTorrentRepository {
    pool: AsyncSqlitePool,
}

impl DieselTorrentRepository {
    /// Create a new repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a torrent by its composite key.
    pub async fn get(&self, provider: &str, topic_id: &str) -> Result<Option<Torrent>, DieselError> {
        let mut conn = self.pool.get().await?;

        torrents::table
            .filter(torrents::provider.eq(provider))
            .filter(torrents::topic_id.eq(topic_id))
            .select(TorrentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Torrent::from))
    }

    /// Return the torrent stored under `(provider, topic_id)`, inserting
    /// `template` under that key first if none exists.
    ///
    /// The template's media association is only used when the row is
    /// created; an existing row keeps its original media.
    pub async fn find_or_create(
        &self,
        provider: &str,
        topic_id: &str,
        template: &Torrent,
    ) -> Result<Torrent, DieselError> {
        let mut conn = self.pool.get().await?;
        let created_at = template.created_at.to_rfc3339();
        let updated_at = template.updated_at.to_rfc3339();

        diesel::insert_into(torrents::table)
            .values(&NewTorrent {
                provider,
                topic_id,
                media_id: template.media_id,
                provider_title: &template.provider_title,
                url: &template.url,
                seed: template.seed,
                peer: template.peer,
                quality: &template.quality,
                language: &template.language,
                size: template.size,
                created_at: &created_at,
                updated_at: &updated_at,
            })
            .on_conflict((torrents::provider, torrents::topic_id))
            .do_nothing()
            .execute(&mut conn)
            .await?;

        torrents::table
            .filter(torrents::provider.eq(provider))
            .filter(torrents::topic_id.eq(topic_id))
            .select(TorrentRecord::as_select())
            .first(&mut conn)
            .await
            .map(Torrent::from)
    }

    /// Write the mutable fields of a torrent back to its row.
    ///
    /// Returns false if no row exists under the torrent's key.
    pub async fn update(&self, torrent: &Torrent) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let updated_at = Utc::now().to_rfc3339();

        let rows = diesel::update(
            torrents::table
                .filter(torrents::provider.eq(&torrent.provider))
                .filter(torrents::topic_id.eq(&torrent.topic_id)),
        )
        .set((
            torrents::provider_title.eq(&torrent.provider_title),
            torrents::url.eq(&torrent.url),
            torrents::seed.eq(torrent.seed),
            torrents::peer.eq(torrent.peer),
            torrents::quality.eq(&torrent.quality),
            torrents::language.eq(&torrent.language),
            torrents::size.eq(torrent.size),
            torrents::updated_at.eq(&updated_at),
        ))
        .execute(&mut conn)
        .await?;

        Ok(rows > 0)
    }

    /// List torrents, most recently updated first.
    pub async fn list(
        &self,
        provider: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Torrent>, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = torrents::table
            .select(TorrentRecord::as_select())
            .order(torrents::updated_at.desc())
            .limit(limit)
            .into_boxed();
        if let Some(provider) = provider {
            query = query.filter(torrents::provider.eq(provider));
        }

        query
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Torrent::from).collect())
    }

    /// Count torrents stored for a provider.
    pub async fn count(&self, provider: &str) -> Result<i64, DieselError> {
        use diesel::dsl::count_star;
        let mut conn = self.pool.get().await?;

        torrents::table
            .filter(torrents::provider.eq(provider))
            .select(count_star())
            .first(&mut conn)
            .await
    }
}

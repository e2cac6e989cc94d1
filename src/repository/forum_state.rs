//! Diesel-based scheduler state repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::ForumStateRecord;
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{parse_datetime, parse_datetime_opt, to_diesel_error};
use crate::models::ForumState;
use crate::schema::forum_state;

/// Convert a database record to a domain model.
impl From<ForumStateRecord> for ForumState {
    fn from(record: ForumStateRecord) -> Self {
        ForumState {
            spider: record.spider,
            forum_id: u32::try_from(record.forum_id).unwrap_or_default(),
            page: u32::try_from(record.page).unwrap_or(1).max(1),
            last_hours: record.last_hours.and_then(|h| u32::try_from(h).ok()),
            next_run_at: parse_datetime_opt(record.next_run_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Narrow an unsigned value into an INTEGER column, failing instead of wrapping.
fn to_column(value: u32, column: &str) -> Result<i32, DieselError> {
    i32::try_from(value)
        .map_err(|_| to_diesel_error(format!("{} out of range: {}", column, value)))
}

/// Diesel-based forum state repository.
#[derive(Clone)]
pub struct DieselForumStateRepository {
    pool: AsyncSqlitePool,
}

impl DieselForumStateRepository {
    /// Create a new repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get the stored state for a spider's forum.
    pub async fn get(&self, spider: &str, forum_id: u32) -> Result<Option<ForumState>, DieselError> {
        let forum_id = to_column(forum_id, "forum_id")?;
        let mut conn = self.pool.get().await?;

        forum_state::table
            .filter(forum_state::spider.eq(spider))
            .filter(forum_state::forum_id.eq(forum_id))
            .select(ForumStateRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(ForumState::from))
    }

    /// Save a state (insert or replace).
    pub async fn save(&self, state: &ForumState) -> Result<(), DieselError> {
        let forum_id = to_column(state.forum_id, "forum_id")?;
        let page = to_column(state.page, "page")?;
        let last_hours = state
            .last_hours
            .map(|h| to_column(h, "last_hours"))
            .transpose()?;
        let mut conn = self.pool.get().await?;
        let next_run_at = state.next_run_at.map(|dt| dt.to_rfc3339());
        let updated_at = Utc::now().to_rfc3339();

        // Use replace_into for SQLite upsert
        diesel::replace_into(forum_state::table)
            .values((
                forum_state::spider.eq(&state.spider),
                forum_state::forum_id.eq(forum_id),
                forum_state::page.eq(page),
                forum_state::last_hours.eq(last_hours),
                forum_state::next_run_at.eq(&next_run_at),
                forum_state::updated_at.eq(&updated_at),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

//! Diesel ORM models for database tables.
//!
//! Timestamps are stored as RFC 3339 text.

use diesel::prelude::*;

use crate::schema;

/// Media record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::media)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MediaRecord {
    pub id: i32,
    pub imdb_id: String,
    pub kind: String,
    pub title: String,
    pub created_at: String,
}

/// New media for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::media)]
pub struct NewMedia<'a> {
    pub imdb_id: &'a str,
    pub kind: &'a str,
    pub title: &'a str,
    pub created_at: &'a str,
}

/// Torrent record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::torrents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TorrentRecord {
    pub id: i32,
    pub provider: String,
    pub topic_id: String,
    pub media_id: i32,
    pub provider_title: String,
    pub url: String,
    pub seed: i32,
    pub peer: i32,
    pub quality: String,
    pub language: String,
    pub size: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// New torrent for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::torrents)]
pub struct NewTorrent<'a> {
    pub provider: &'a str,
    pub topic_id: &'a str,
    pub media_id: i32,
    pub provider_title: &'a str,
    pub url: &'a str,
    pub seed: i32,
    pub peer: i32,
    pub quality: &'a str,
    pub language: &'a str,
    pub size: i64,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Forum state record from the database.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::forum_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ForumStateRecord {
    pub spider: String,
    pub forum_id: i32,
    pub page: i32,
    pub last_hours: Option<i32>,
    pub next_run_at: Option<String>,
    pub updated_at: String,
}

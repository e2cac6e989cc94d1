//! Catalog media entries that crawled torrents attach to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "show" => Some(Self::Show),
            _ => None,
        }
    }
}

/// A catalog entry identified by its IMDb code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Internal catalog identifier.
    pub id: i32,
    /// External IMDb code, e.g. `tt0111161`.
    pub imdb_id: String,
    pub kind: MediaKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Media {
    pub fn is_movie(&self) -> bool {
        self.kind == MediaKind::Movie
    }
}

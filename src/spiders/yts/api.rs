//! YTS API payloads.
//!
//! The API is loose about types (ids and counts show up as numbers or
//! strings, missing values as null), so every field is decoded leniently
//! and numeric fields are coerced to integers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub const LIST_ENDPOINT: &str = "api/v2/list_movies.json";
pub const DETAILS_ENDPOINT: &str = "api/v2/movie_details.json";

/// One movie (container item) from a listing or detail response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub imdb_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub torrents: Vec<TorrentData>,
}

/// One torrent (variant) of a movie.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TorrentData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub hash: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub seeds: i32,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub peers: i32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quality: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub size_bytes: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub date_uploaded_unix: i64,
}

/// Movies listed in a `list_movies` response.
///
/// A missing or null `data.movies` yields no movies. Entries that do not
/// decode are skipped on their own.
pub fn movies_from_page(payload: &Value) -> Vec<MovieData> {
    let movies = match payload.pointer("/data/movies") {
        Some(Value::Array(movies)) => movies,
        _ => return Vec::new(),
    };

    movies
        .iter()
        .enumerate()
        .filter_map(|(index, movie)| {
            serde_json::from_value::<MovieData>(movie.clone())
                .map_err(|e| warn!("Skipping malformed movie #{}: {}", index, e))
                .ok()
        })
        .collect()
}

/// Movie contained in a `movie_details` response, if any.
pub fn movie_from_details(payload: &Value) -> Option<MovieData> {
    match payload.pointer("/data/movie") {
        Some(movie @ Value::Object(fields)) if !fields.is_empty() => {
            serde_json::from_value(movie.clone())
                .map_err(|e| warn!("Discarding malformed movie details: {}", e))
                .ok()
        }
        _ => None,
    }
}

/// Coerce a JSON scalar to an integer: numbers are truncated, numeric
/// strings parsed, booleans map to 0/1, anything else is 0.
pub fn coerce_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(coerce_i64(&Value::deserialize(deserializer)?))
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = coerce_i64(&Value::deserialize(deserializer)?);
    Ok(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

//! End-to-end tests for the YTS spider against a mock API.
//!
//! Uses wiremock to stand in for the YTS HTTP API, and exercises the spider
//! with both the in-memory and the SQLite torrent services.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use seedwatch::http_client::{HttpClient, HttpError};
use seedwatch::models::{ForumCursor, MediaKind, TopicRef};
use seedwatch::repository::DbContext;
use seedwatch::services::{DieselTorrentService, InMemoryTorrentService};
use seedwatch::spiders::{Spider, SpiderError, Yts};

const LIST_PATH: &str = "/api/v2/list_movies.json";
const DETAILS_PATH: &str = "/api/v2/movie_details.json";

fn movie(id: u64, imdb: &str, title: &str, torrents: Value) -> Value {
    json!({
        "id": id,
        "imdb_code": imdb,
        "title": title,
        "language": "en",
        "torrents": torrents,
    })
}

fn torrent(hash: &str, seeds: i64, peers: i64, uploaded: i64) -> Value {
    json!({
        "hash": hash,
        "quality": "1080p",
        "seeds": seeds,
        "peers": peers,
        "size_bytes": 1_932_735_283_i64,
        "date_uploaded_unix": uploaded,
    })
}

fn page(movies: Vec<Value>) -> Value {
    json!({
        "status": "ok",
        "data": { "movie_count": movies.len(), "movies": movies },
    })
}

async fn mount_page(server: &MockServer, number: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("limit", "50"))
        .and(query_param("page", number.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn spider(server: &MockServer, service: Arc<dyn seedwatch::services::TorrentService>) -> Yts {
    let client = HttpClient::new(
        Yts::NAME,
        &format!("{}/", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    Yts::new(client, service).with_seed(7)
}

#[tokio::test]
async fn test_page_reconciles_matched_movies_and_continues() {
    let server = MockServer::start().await;
    let now = Utc::now().timestamp();
    mount_page(
        &server,
        1,
        page(vec![
            movie(1, "tt001", "Movie A", json!([torrent("abc", 5, 2, now)])),
            movie(2, "tt999", "Movie B", json!([torrent("def", 9, 9, now)])),
        ]),
    )
    .await;

    let service = Arc::new(InMemoryTorrentService::new());
    let media = service.add_media("tt001", MediaKind::Movie, "Movie A").await;
    let yts = spider(&server, service.clone());

    let next = yts
        .get_page(&ForumCursor::new(1, 1, None))
        .await
        .unwrap()
        .expect("continuation");
    assert_eq!(next.id, 1);
    assert_eq!(next.page, 2);
    assert_eq!(next.last, None);
    assert!((1800..=3600).contains(&next.delay));

    let stored = service.torrents().await;
    assert_eq!(stored.len(), 1);
    let t = &stored[0];
    assert_eq!(t.provider, "yts");
    assert_eq!(t.topic_id, "1:abc");
    assert_eq!(t.media_id, media.id);
    assert_eq!((t.seed, t.peer), (5, 2));
    assert_eq!(t.provider_title, "Movie A");
    assert_eq!(t.language, "en");
    assert!(t.url.starts_with("magnet:?xt=urn:btih:abc&tr="));
}

#[tokio::test]
async fn test_empty_page_stops_without_writes() {
    let server = MockServer::start().await;
    mount_page(&server, 3, page(vec![])).await;

    let service = Arc::new(InMemoryTorrentService::new());
    service.add_media("tt001", MediaKind::Movie, "Movie A").await;
    let yts = spider(&server, service.clone());

    let next = yts.get_page(&ForumCursor::new(1, 3, None)).await.unwrap();
    assert!(next.is_none());
    assert!(service.torrents().await.is_empty());
}

#[tokio::test]
async fn test_missing_movies_field_stops() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"status": "ok", "data": {"movie_count": 0}})).await;

    let yts = spider(&server, Arc::new(InMemoryTorrentService::new()));
    assert!(yts.get_page(&ForumCursor::new(1, 1, Some(24))).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stale_page_still_reconciled_but_stops() {
    let server = MockServer::start().await;
    let two_hours_ago = Utc::now().timestamp() - 7200;
    mount_page(
        &server,
        1,
        page(vec![movie(1, "tt001", "Movie A", json!([torrent("abc", 3, 1, two_hours_ago)]))]),
    )
    .await;

    let service = Arc::new(InMemoryTorrentService::new());
    service.add_media("tt001", MediaKind::Movie, "Movie A").await;
    let yts = spider(&server, service.clone());

    let next = yts.get_page(&ForumCursor::new(1, 1, Some(1))).await.unwrap();
    assert!(next.is_none());
    assert!(service.get_torrent("yts", "1:abc").await.is_some());
}

#[tokio::test]
async fn test_show_is_not_reconciled() {
    let server = MockServer::start().await;
    let now = Utc::now().timestamp();
    mount_page(
        &server,
        1,
        page(vec![movie(1, "tt001", "Series", json!([torrent("abc", 1, 1, now)]))]),
    )
    .await;

    let service = Arc::new(InMemoryTorrentService::new());
    service.add_media("tt001", MediaKind::Show, "Series").await;
    let yts = spider(&server, service.clone());

    let next = yts.get_page(&ForumCursor::new(1, 1, None)).await.unwrap();
    assert!(next.is_some());
    assert!(service.torrents().await.is_empty());
}

#[tokio::test]
async fn test_server_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = Arc::new(InMemoryTorrentService::new());
    let yts = spider(&server, service.clone());

    let err = yts.get_page(&ForumCursor::new(1, 1, None)).await.unwrap_err();
    assert!(matches!(
        err,
        SpiderError::Http(HttpError::Status { status: 500, .. })
    ));
    assert!(service.torrents().await.is_empty());
}

#[tokio::test]
async fn test_invalid_json_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let yts = spider(&server, Arc::new(InMemoryTorrentService::new()));
    let err = yts.get_page(&ForumCursor::new(1, 1, None)).await.unwrap_err();
    assert!(matches!(err, SpiderError::Http(HttpError::Decode { .. })));
}

#[tokio::test]
async fn test_get_topic_refreshes_movie() {
    let server = MockServer::start().await;
    let now = Utc::now().timestamp();
    Mock::given(method("GET"))
        .and(path(DETAILS_PATH))
        .and(query_param("movie_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "movie": movie(42, "tt042", "Answer", json!([
                torrent("h720", 11, 4, now),
                torrent("h1080", 20, 6, now),
            ])) },
        })))
        .mount(&server)
        .await;

    let service = Arc::new(InMemoryTorrentService::new());
    service.add_media("tt042", MediaKind::Movie, "Answer").await;
    let yts = spider(&server, service.clone());

    yts.get_topic(&TopicRef::new("42:h720")).await.unwrap();

    let topics: Vec<String> = service
        .torrents()
        .await
        .into_iter()
        .map(|t| t.topic_id)
        .collect();
    assert_eq!(topics, vec!["42:h1080", "42:h720"]);
}

#[tokio::test]
async fn test_get_topic_without_movie_is_noop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DETAILS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "movie": {} },
        })))
        .mount(&server)
        .await;

    let service = Arc::new(InMemoryTorrentService::new());
    let yts = spider(&server, service.clone());

    yts.get_topic(&TopicRef::new("7")).await.unwrap();
    assert!(service.torrents().await.is_empty());
}

#[tokio::test]
async fn test_get_topic_for_uncatalogued_movie_is_noop() {
    let server = MockServer::start().await;
    let now = Utc::now().timestamp();
    Mock::given(method("GET"))
        .and(path(DETAILS_PATH))
        .and(query_param("movie_id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": { "movie": movie(9, "tt404", "Unknown", json!([torrent("h9", 3, 1, now)])) },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = Arc::new(InMemoryTorrentService::new());
    service.add_media("tt001", MediaKind::Movie, "Movie A").await;
    let yts = spider(&server, service.clone());

    yts.get_topic(&TopicRef::new("9:h9")).await.unwrap();
    assert!(service.torrents().await.is_empty());
}

async fn sqlite_context() -> (DbContext, TempDir) {
    let dir = TempDir::new().unwrap();
    let ctx = DbContext::from_sqlite_path(&dir.path().join("seedwatch.db"));
    ctx.init_schema().await.unwrap();
    (ctx, dir)
}

#[tokio::test]
async fn test_sqlite_recrawl_updates_in_place() {
    let server = MockServer::start().await;
    let now = Utc::now().timestamp();
    let (ctx, _dir) = sqlite_context().await;
    let media = ctx
        .media()
        .upsert("tt001", MediaKind::Movie, "Movie A")
        .await
        .unwrap();
    let yts = spider(&server, Arc::new(DieselTorrentService::new(&ctx)));

    mount_page(
        &server,
        1,
        page(vec![movie(
            1,
            "tt001",
            "Movie A",
            json!([torrent("abc", 5, 2, now), torrent("xyz", 1, 0, now)]),
        )]),
    )
    .await;
    yts.get_page(&ForumCursor::new(1, 1, None)).await.unwrap();

    let first = ctx.torrents().get("yts", "1:abc").await.unwrap().unwrap();
    assert_eq!(first.media_id, media.id);
    assert_eq!(ctx.torrents().count("yts").await.unwrap(), 2);

    server.reset().await;
    mount_page(
        &server,
        1,
        page(vec![movie(1, "tt001", "Movie A", json!([torrent("abc", 50, 20, now)]))]),
    )
    .await;
    yts.get_page(&ForumCursor::new(1, 1, None)).await.unwrap();

    let second = ctx.torrents().get("yts", "1:abc").await.unwrap().unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!((second.seed, second.peer), (50, 20));
    assert_eq!(ctx.torrents().count("yts").await.unwrap(), 2);
}

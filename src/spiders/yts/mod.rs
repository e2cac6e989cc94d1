//! Spider for the YTS movie catalog API.
//!
//! Each listing page is fetched once; the page decides whether the crawl
//! should continue to the next page, and every movie on it that resolves to
//! a catalog movie has its torrents reconciled into the local store.

pub mod api;
pub mod magnet;
pub mod plan;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use self::api::{movie_from_details, movies_from_page, MovieData, TorrentData};
use self::magnet::{topic_id, TorrentFields};
use self::plan::plan_page;
use super::{ranking, Spider, SpiderError};
use crate::config::{Settings, SpiderConfig};
use crate::http_client::HttpClient;
use crate::models::{ForumCursor, Media, Torrent, TopicRef};
use crate::services::TorrentService;

pub const BASE_URL: &str = "https://yts.mx/";

/// Movies requested per listing page.
pub const PAGE_SIZE: u32 = 50;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Torrents in this language are crawled first.
pub const PRIMARY_LANGUAGE: &str = "en";
pub const PRIMARY_LANGUAGE_PRIORITY: i32 = 10;

/// YTS spider.
pub struct Yts {
    client: HttpClient,
    service: Arc<dyn TorrentService>,
    rng: Mutex<StdRng>,
}

impl Yts {
    pub const NAME: &'static str = "yts";

    pub fn new(client: HttpClient, service: Arc<dyn TorrentService>) -> Self {
        Self {
            client,
            service,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Spider against the public API with the default timeout.
    pub fn with_defaults(service: Arc<dyn TorrentService>) -> Result<Self, SpiderError> {
        let client = HttpClient::new(Self::NAME, BASE_URL, FETCH_TIMEOUT)?;
        Ok(Self::new(client, service))
    }

    /// Spider built from configuration.
    pub fn from_config(
        config: &SpiderConfig,
        settings: &Settings,
        service: Arc<dyn TorrentService>,
    ) -> Result<Self, SpiderError> {
        let client = HttpClient::with_user_agent(
            Self::NAME,
            &config.base_url_or(BASE_URL),
            settings.request_timeout(),
            settings.user_agent.as_deref(),
        )?;
        Ok(Self::new(client, service))
    }

    /// Reseed the delay generator.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<MovieData>, SpiderError> {
        let payload = self
            .client
            .get_json(
                api::LIST_ENDPOINT,
                &[("limit", PAGE_SIZE.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(movies_from_page(&payload))
    }

    /// Reconcile every torrent of a movie.
    ///
    /// Returns `None` when the movie has no catalog counterpart.
    async fn reconcile_movie(&self, movie: &MovieData) -> Result<Option<usize>, SpiderError> {
        let media = match self.service.find_media_by_imdb(&movie.imdb_code).await? {
            Some(media) if media.is_movie() => media,
            _ => {
                debug!(
                    "[{}] No catalog movie for {} ({})",
                    Self::NAME,
                    movie.imdb_code,
                    movie.title
                );
                return Ok(None);
            }
        };

        for torrent in &movie.torrents {
            self.reconcile(&media, movie, torrent).await?;
        }
        Ok(Some(movie.torrents.len()))
    }

    async fn reconcile(
        &self,
        media: &Media,
        movie: &MovieData,
        torrent: &TorrentData,
    ) -> Result<(), SpiderError> {
        let topic_id = topic_id(movie, torrent);
        let mut stored = self
            .service
            .find_or_create_torrent(Self::NAME, &topic_id, Torrent::template(media.id))
            .await?;

        TorrentFields::build(movie, torrent).apply_to(&mut stored);
        self.service.update_torrent(&stored).await?;

        debug!(
            "[{}] Reconciled {} (seed {}, peer {})",
            Self::NAME,
            topic_id,
            stored.seed,
            stored.peer
        );
        Ok(())
    }
}

#[async_trait]
impl Spider for Yts {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn forum_keys(&self) -> Vec<u32> {
        vec![1]
    }

    async fn get_page(&self, forum: &ForumCursor) -> Result<Option<ForumCursor>, SpiderError> {
        let movies = self.fetch_page(forum.page).await?;

        let plan = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            plan_page(forum, &movies, Utc::now(), &mut *rng)
        };

        if plan.movies.is_empty() {
            debug!("[{}] Page {} is empty", Self::NAME, forum.page);
            return Ok(None);
        }

        let mut reconciled = 0;
        let mut skipped = 0;
        for movie in plan.movies {
            match self.reconcile_movie(movie).await? {
                Some(count) => reconciled += count,
                None => skipped += 1,
            }
        }

        info!(
            "[{}] Page {}: {} movies, {} torrents reconciled, {} movies skipped, continue: {}",
            Self::NAME,
            forum.page,
            plan.movies.len(),
            reconciled,
            skipped,
            plan.continuation.is_some()
        );

        Ok(plan.continuation)
    }

    async fn get_topic(&self, topic: &TopicRef) -> Result<(), SpiderError> {
        let payload = self
            .client
            .get_json(
                api::DETAILS_ENDPOINT,
                &[("movie_id", topic.container_id().to_string())],
            )
            .await?;

        let Some(movie) = movie_from_details(&payload) else {
            debug!("[{}] No movie behind topic {}", Self::NAME, topic.id);
            return Ok(());
        };

        self.reconcile_movie(&movie).await?;
        Ok(())
    }

    fn priority(&self, torrent: &Torrent) -> i32 {
        if torrent.language == PRIMARY_LANGUAGE {
            return PRIMARY_LANGUAGE_PRIORITY;
        }
        ranking::default_priority(torrent)
    }
}

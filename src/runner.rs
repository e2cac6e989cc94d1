//! Crawl scheduler.
//!
//! Drives every registered spider forum by forum. The position of each
//! forum survives restarts in the `forum_state` table; a forum that stops
//! yielding new items goes back to page one and idles until it is due again.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::models::ForumState;
use crate::repository::{DbContext, DieselError, DieselForumStateRepository};
use crate::spiders::{Spider, SpiderError, SpiderRegistry};

/// Default wait before a finished forum is crawled again.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(3600);

/// Default wait before a failed forum is retried.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Spider(#[from] SpiderError),
    #[error("forum state error: {0}")]
    State(#[from] DieselError),
}

/// What a single forum run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForumOutcome {
    /// The next page is scheduled after `delay` seconds.
    Continued { page: u32, delay: u64 },
    /// The forum was reset to the first page and is idle.
    Finished,
}

/// Totals for one pass over all due forums.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ran: usize,
    pub failed: usize,
}

/// Scheduler over a set of spiders.
pub struct CrawlRunner {
    registry: SpiderRegistry,
    states: DieselForumStateRepository,
    watermarks: HashMap<String, Option<u32>>,
    idle_interval: Duration,
    retry_delay: Duration,
}

impl CrawlRunner {
    pub fn new(registry: SpiderRegistry, ctx: &DbContext) -> Self {
        Self {
            registry,
            states: ctx.forum_state(),
            watermarks: HashMap::new(),
            idle_interval: DEFAULT_IDLE_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the watermark (in hours) used when a spider's forums start over.
    pub fn with_watermark(mut self, spider: &str, last_hours: Option<u32>) -> Self {
        self.watermarks.insert(spider.to_string(), last_hours);
        self
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn registry(&self) -> &SpiderRegistry {
        &self.registry
    }

    fn watermark(&self, spider: &str) -> Option<u32> {
        self.watermarks.get(spider).copied().flatten()
    }

    async fn load_state(&self, spider: &str, forum_id: u32) -> Result<ForumState, RunnerError> {
        Ok(self
            .states
            .get(spider, forum_id)
            .await?
            .unwrap_or_else(|| ForumState::new(spider, forum_id, self.watermark(spider))))
    }

    /// Fetch the stored page of one forum and schedule what comes next.
    pub async fn run_forum(
        &self,
        spider: &dyn Spider,
        forum_id: u32,
    ) -> Result<ForumOutcome, RunnerError> {
        let mut state = self.load_state(spider.name(), forum_id).await?;
        let cursor = state.cursor();
        debug!("[{}] Fetching forum {} page {}", spider.name(), forum_id, cursor.page);

        let next = spider.get_page(&cursor).await?;
        let now = Utc::now();

        let outcome = match next {
            Some(next) => {
                state.page = next.page;
                state.last_hours = next.last;
                state.next_run_at = Some(now + seconds(next.delay));
                ForumOutcome::Continued {
                    page: next.page,
                    delay: next.delay,
                }
            }
            None => {
                state.page = 1;
                state.last_hours = self.watermark(spider.name());
                state.next_run_at = Some(now + seconds(self.idle_interval.as_secs()));
                ForumOutcome::Finished
            }
        };

        state.updated_at = now;
        self.states.save(&state).await?;
        Ok(outcome)
    }

    /// Push a failed forum's next run out by the retry delay, keeping its
    /// page and watermark.
    async fn defer(&self, spider: &str, forum_id: u32) -> Result<(), RunnerError> {
        let mut state = self.load_state(spider, forum_id).await?;
        let now = Utc::now();
        state.next_run_at = Some(now + seconds(self.retry_delay.as_secs()));
        state.updated_at = now;
        self.states.save(&state).await?;
        Ok(())
    }

    /// Run every forum whose next run time has passed.
    ///
    /// A failing forum is logged and retried after the retry delay; the
    /// others still run.
    pub async fn run_due(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::default();

        for spider in self.registry.iter() {
            for forum_id in spider.forum_keys() {
                let state = self.load_state(spider.name(), forum_id).await?;
                if !state.is_due(Utc::now()) {
                    continue;
                }

                summary.ran += 1;
                match self.run_forum(spider.as_ref(), forum_id).await {
                    Ok(outcome) => {
                        debug!("[{}] Forum {}: {:?}", spider.name(), forum_id, outcome)
                    }
                    Err(e) => {
                        summary.failed += 1;
                        error!("[{}] Forum {} failed: {}", spider.name(), forum_id, e);
                        self.defer(spider.name(), forum_id).await?;
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Earliest scheduled run among registered forums.
    ///
    /// Forums without stored state are due immediately.
    pub async fn next_due(&self) -> Result<Option<DateTime<Utc>>, RunnerError> {
        let mut earliest: Option<DateTime<Utc>> = None;

        for spider in self.registry.iter() {
            for forum_id in spider.forum_keys() {
                let at = match self.states.get(spider.name(), forum_id).await? {
                    Some(state) => state.next_run_at.unwrap_or_else(Utc::now),
                    None => Utc::now(),
                };
                earliest = Some(earliest.map_or(at, |e| e.min(at)));
            }
        }

        Ok(earliest)
    }

    /// Run due forums until Ctrl-C, sleeping at most `interval` between passes.
    pub async fn daemon(&self, interval: Duration) -> Result<(), RunnerError> {
        info!("Starting crawl daemon ({} spiders)", self.registry.names().len());

        loop {
            let summary = self.run_due().await?;
            if summary.ran > 0 {
                info!("Crawl pass: {} forums run, {} failed", summary.ran, summary.failed);
            }

            let wait = match self.next_due().await? {
                Some(at) => (at - Utc::now()).to_std().unwrap_or_default().min(interval),
                None => interval,
            };
            debug!("Sleeping {}s until next due forum", wait.as_secs());

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping crawl daemon");
                    return Ok(());
                }
            }
        }
    }
}

fn seconds(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

//! Crawl commands: one-off pages, single topics, and the scheduler daemon.

use std::time::Duration;

use console::style;

use seedwatch::config::{Config, Settings};
use seedwatch::models::{ForumCursor, TopicRef};
use seedwatch::runner::CrawlRunner;

use crate::cli::helpers::{build_registry, find_spider, open_database, print_error};

/// Crawl a forum page, optionally following continuations.
pub async fn cmd_crawl(
    settings: &Settings,
    config: &Config,
    spider_name: &str,
    forum: Option<u32>,
    page: u32,
    last: Option<u32>,
    follow: bool,
) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let registry = build_registry(&ctx, settings, config)?;
    let spider = find_spider(&registry, spider_name)?;

    let forum_id = match forum {
        Some(id) => id,
        None => spider
            .forum_keys()
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Spider '{}' has no forums", spider_name))?,
    };
    let last = last.or(config.spider(spider_name).last_hours);
    let mut cursor = ForumCursor::new(forum_id, page, last);

    loop {
        println!(
            "{} Crawling {} forum {} page {}",
            style("→").cyan(),
            spider_name,
            cursor.id,
            cursor.page
        );

        let Some(next) = spider.get_page(&cursor).await? else {
            println!("{} No more new items", style("✓").green());
            return Ok(());
        };

        if !follow {
            println!(
                "{} Next: page {} in {}s (use --follow to continue)",
                style("✓").green(),
                next.page,
                next.delay
            );
            return Ok(());
        }

        println!(
            "{} Sleeping {}s before page {}...",
            style("→").dim(),
            next.delay,
            next.page
        );
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(next.delay)) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("{} Interrupted", style("!").yellow());
                return Ok(());
            }
        }
        cursor = next;
    }
}

/// Refresh one topic.
pub async fn cmd_topic(
    settings: &Settings,
    config: &Config,
    spider_name: &str,
    topic_id: &str,
) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let registry = build_registry(&ctx, settings, config)?;
    let spider = find_spider(&registry, spider_name)?;

    spider.get_topic(&TopicRef::new(topic_id)).await?;
    println!("{} Refreshed topic {}", style("✓").green(), topic_id);
    Ok(())
}

/// Run the scheduler until interrupted.
pub async fn cmd_daemon(settings: &Settings, config: &Config, interval: u64) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let registry = build_registry(&ctx, settings, config)?;

    if registry.is_empty() {
        print_error("No spiders enabled");
        return Ok(());
    }

    let mut runner = CrawlRunner::new(registry, &ctx).with_idle_interval(settings.idle_interval());
    let names: Vec<String> = runner
        .registry()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    for name in &names {
        runner = runner.with_watermark(name, config.spider(name).last_hours);
    }

    println!(
        "{} Crawling {} (Ctrl-C to stop)",
        style("→").cyan(),
        names.join(", ")
    );
    runner.daemon(Duration::from_secs(interval)).await?;
    println!("{} Stopped", style("✓").green());
    Ok(())
}

//! Catalog and torrent listing commands.

use console::style;

use seedwatch::config::{Config, Settings};
use seedwatch::models::MediaKind;

use crate::cli::helpers::{build_registry, format_bytes, open_database, truncate};

/// List spiders with their forums and stored torrent counts.
pub async fn cmd_spiders(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let registry = build_registry(&ctx, settings, config)?;

    if registry.is_empty() {
        println!("{} No spiders enabled", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Spiders").bold());
    println!("{}", "-".repeat(50));
    println!("{:<12} {:<12} {:<10} Torrents", "Name", "Forums", "Last (h)");
    println!("{}", "-".repeat(50));

    let torrents = ctx.torrents();
    for spider in registry.iter() {
        let forums = spider
            .forum_keys()
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let last = config
            .spider(spider.name())
            .last_hours
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".to_string());
        let count = torrents.count(spider.name()).await?;

        println!("{:<12} {:<12} {:<10} {}", spider.name(), forums, last, count);
    }

    Ok(())
}

/// Add or update a catalog entry.
pub async fn cmd_media_add(
    settings: &Settings,
    imdb_id: &str,
    title: &str,
    kind: MediaKind,
) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let media = ctx.media().upsert(imdb_id, kind, title).await?;

    println!(
        "{} {} {} ({}) as #{}",
        style("✓").green(),
        media.kind.as_str(),
        style(&media.title).cyan(),
        media.imdb_id,
        media.id
    );
    Ok(())
}

/// List catalog entries.
pub async fn cmd_media_list(settings: &Settings) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let entries = ctx.media().get_all().await?;

    if entries.is_empty() {
        println!(
            "{} Catalog is empty. Add entries with 'seedwatch media add'.",
            style("!").yellow()
        );
        return Ok(());
    }

    println!("{:<6} {:<12} {:<7} Title", "ID", "IMDb", "Kind");
    for media in entries {
        println!(
            "{:<6} {:<12} {:<7} {}",
            media.id,
            media.imdb_id,
            media.kind.as_str(),
            truncate(&media.title, 50)
        );
    }
    Ok(())
}

/// List stored torrents with their crawl priority.
pub async fn cmd_torrents(
    settings: &Settings,
    config: &Config,
    spider: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let ctx = open_database(settings)?;
    let registry = build_registry(&ctx, settings, config)?;
    let torrents = ctx.torrents().list(spider, limit).await?;

    if torrents.is_empty() {
        println!("{} No torrents stored", style("!").yellow());
        return Ok(());
    }

    println!(
        "{:<8} {:<16} {:<36} {:<7} {:>5} {:>5} {:>10} Prio",
        "Spider", "Topic", "Title", "Quality", "Seed", "Peer", "Size"
    );
    println!("{}", "-".repeat(105));

    for torrent in torrents {
        let priority = registry
            .get(&torrent.provider)
            .map(|s| s.priority(&torrent).to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<8} {:<16} {:<36} {:<7} {:>5} {:>5} {:>10} {}",
            torrent.provider,
            truncate(&torrent.topic_id, 16),
            truncate(&torrent.provider_title, 36),
            torrent.quality,
            torrent.seed,
            torrent.peer,
            format_bytes(torrent.size),
            priority
        );
    }
    Ok(())
}

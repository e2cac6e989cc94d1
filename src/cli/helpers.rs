//! Shared helper functions for CLI commands.

use std::sync::Arc;

use console::style;

use seedwatch::config::{Config, Settings};
use seedwatch::repository::DbContext;
use seedwatch::services::DieselTorrentService;
use seedwatch::spiders::{Spider, SpiderRegistry};

/// Truncate a string to `max` characters, appending "..." when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Format bytes as human-readable size.
pub fn format_bytes(bytes: i64) -> String {
    let bytes = bytes.max(0) as f64;
    if bytes >= 1_000_000_000.0 {
        format!("{:.2} GB", bytes / 1_000_000_000.0)
    } else if bytes >= 1_000_000.0 {
        format!("{:.2} MB", bytes / 1_000_000.0)
    } else if bytes >= 1_000.0 {
        format!("{:.2} KB", bytes / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Database context for an initialized data directory.
pub fn open_database(settings: &Settings) -> anyhow::Result<DbContext> {
    if !settings.database_exists() {
        anyhow::bail!(
            "No database at {}. Run 'seedwatch init' first.",
            settings.database_path().display()
        );
    }
    Ok(settings.create_db_context())
}

/// Registry of configured spiders backed by the local database.
pub fn build_registry(
    ctx: &DbContext,
    settings: &Settings,
    config: &Config,
) -> anyhow::Result<SpiderRegistry> {
    let service = Arc::new(DieselTorrentService::new(ctx));
    Ok(SpiderRegistry::from_config(config, settings, service)?)
}

/// Look up a spider by name, listing the known ones on a miss.
pub fn find_spider(registry: &SpiderRegistry, name: &str) -> anyhow::Result<Arc<dyn Spider>> {
    registry.get(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown or disabled spider '{}'. Available: {}",
            name,
            registry.names().join(", ")
        )
    })
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

//! Initialize command.

use console::style;

use seedwatch::config::{Config, Settings};

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    if config.source_path.is_none() {
        println!(
            "{} No config file found, using defaults",
            style("!").yellow()
        );
        println!(
            "  Create {} to configure spiders",
            settings.data_dir.join("seedwatch.toml").display()
        );
    }

    println!(
        "{} Initialized seedwatch in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}

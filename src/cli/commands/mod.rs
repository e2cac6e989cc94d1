//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod catalog;
mod crawl;
mod init;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use seedwatch::config::{load_settings_with_options, LoadOptions};
use seedwatch::models::{MediaKind, MAX_LAST_HOURS};

#[derive(Parser)]
#[command(name = "seedwatch")]
#[command(about = "Incremental torrent catalog crawler")]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides config file)
    #[arg(long, short = 'd', global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// List available spiders and their forums
    Spiders,

    /// Crawl one forum page of a spider, ignoring stored schedule state
    Crawl {
        /// Spider name
        spider: String,
        /// Forum to crawl (default: the spider's first forum)
        #[arg(long)]
        forum: Option<u32>,
        /// Page to start from
        #[arg(long, default_value = "1")]
        page: u32,
        /// Only count items uploaded within the last N hours as new
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_LAST_HOURS)))]
        last: Option<u32>,
        /// Keep crawling while the spider advises a next page
        #[arg(long)]
        follow: bool,
    },

    /// Refresh the torrents of a single topic
    Topic {
        /// Spider name
        spider: String,
        /// Topic id, as `<movie id>:<hash>` or just the movie id
        topic_id: String,
    },

    /// Run the crawl scheduler until interrupted
    Daemon {
        /// Maximum seconds between scheduling passes
        #[arg(long, default_value = "300")]
        interval: u64,
    },

    /// Manage the media catalog
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },

    /// List stored torrents
    Torrents {
        /// Only torrents from this spider
        #[arg(long)]
        spider: Option<String>,
        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
enum MediaCommands {
    /// Add or update a catalog entry
    Add {
        /// IMDb id, e.g. tt0111161
        imdb_id: String,
        /// Display title
        title: String,
        #[arg(long, value_enum, default_value = "movie")]
        kind: KindArg,
    },
    /// List catalog entries
    List,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum KindArg {
    Movie,
    Show,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Show => MediaKind::Show,
        }
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data_dir: cli.data_dir,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings, &config).await,
        Commands::Spiders => catalog::cmd_spiders(&settings, &config).await,
        Commands::Crawl {
            spider,
            forum,
            page,
            last,
            follow,
        } => crawl::cmd_crawl(&settings, &config, &spider, forum, page, last, follow).await,
        Commands::Topic { spider, topic_id } => {
            crawl::cmd_topic(&settings, &config, &spider, &topic_id).await
        }
        Commands::Daemon { interval } => crawl::cmd_daemon(&settings, &config, interval).await,
        Commands::Media { command } => match command {
            MediaCommands::Add {
                imdb_id,
                title,
                kind,
            } => catalog::cmd_media_add(&settings, &imdb_id, &title, kind.into()).await,
            MediaCommands::List => catalog::cmd_media_list(&settings).await,
        },
        Commands::Torrents { spider, limit } => {
            catalog::cmd_torrents(&settings, &config, spider.as_deref(), limit).await
        }
    }
}

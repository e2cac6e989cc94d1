//! Configuration management.
//!
//! Config files may be TOML, YAML or JSON; the format is chosen by file
//! extension. Values from the file are applied on top of [`Settings`]
//! defaults, and `DATABASE_URL` from the environment wins over both.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::MAX_LAST_HOURS;
use crate::repository::DbContext;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "seedwatch.db";

/// Basename of auto-discovered config files.
const CONFIG_BASENAME: &str = "seedwatch";
const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Invalid config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Per-spider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiderConfig {
    /// API base URL override.
    pub base_url: Option<String>,
    /// Only items uploaded within this many hours count as new.
    pub last_hours: Option<u32>,
    pub enabled: bool,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            last_hours: None,
            enabled: true,
        }
    }
}

impl SpiderConfig {
    /// Base URL with a trailing slash, so relative endpoints join below it.
    pub fn base_url_or(&self, default: &str) -> String {
        let base = self.base_url.as_deref().unwrap_or(default);
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory; relative paths resolve against the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename inside the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// User agent: unset for the default, "impersonate" for a browser UA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Seconds a finished forum waits before it is crawled again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_interval_secs: Option<u64>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub spiders: HashMap<String, SpiderConfig>,

    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut config = Self::parse(&contents, path)?;
        config.validate().map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load the `seedwatch` config from prefer's standard locations.
    ///
    /// Returns defaults when no config file is found.
    pub async fn discover() -> Result<Self, ConfigError> {
        let discovered = match prefer::load(CONFIG_BASENAME).await {
            Ok(discovered) => discovered,
            Err(e) => {
                tracing::debug!("No config file discovered: {}", e);
                return Ok(Self::default());
            }
        };

        match discovered.source_path() {
            Some(path) => {
                tracing::debug!("Discovered config: {}", path.display());
                Self::load_from_path(path).await
            }
            None => Ok(Self::default()),
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_err(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string())),
            _ => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string())),
        }
    }

    fn validate(&self) -> Result<(), String> {
        for (name, spider) in &self.spiders {
            if let Some(hours) = spider.last_hours.filter(|h| *h > MAX_LAST_HOURS) {
                return Err(format!(
                    "spiders.{}.last_hours is {}, the maximum is {}",
                    name, hours, MAX_LAST_HOURS
                ));
            }
        }
        Ok(())
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are joined to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(idle) = self.idle_interval_secs {
            settings.idle_interval_secs = idle;
        }
    }

    /// Configuration for a spider; unconfigured spiders get defaults.
    pub fn spider(&self, name: &str) -> SpiderConfig {
        self.spiders.get(name).cloned().unwrap_or_default()
    }
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub database_filename: String,
    /// Explicit database URL, overriding `data_dir/database_filename`.
    pub database_url: Option<String>,
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    pub idle_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seedwatch");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            user_agent: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            idle_interval_secs: DEFAULT_IDLE_INTERVAL_SECS,
        }
    }
}

impl Settings {
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Database URL, constructed from the data directory if not set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn database_exists(&self) -> bool {
        self.database_url.is_some() || self.database_path().exists()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of the config file directory.
    pub use_cwd: bool,
    /// Data directory override.
    pub data_dir: Option<PathBuf>,
}

/// Look for `seedwatch.{toml,yaml,yml,json}` in a directory.
fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", CONFIG_BASENAME, ext)))
        .find(|path| path.exists())
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

async fn load_file_config(options: &LoadOptions) -> Result<Config, ConfigError> {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path).await;
    }

    // Priority 2: Config next to the data dir
    let data_dir = options
        .data_dir
        .clone()
        .unwrap_or_else(|| Settings::default().data_dir);
    if let Some(config_path) = find_config_in(&data_dir) {
        tracing::debug!("Found config next to data dir: {}", config_path.display());
        return Config::load_from_path(&config_path).await;
    }

    // Priority 3: Auto-discover via prefer
    Config::discover().await
}

/// Load settings with explicit options.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = load_file_config(&options).await?;
    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        current_dir()
    } else {
        config.base_dir().unwrap_or_else(current_dir)
    };
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(data_dir) = options.data_dir {
        settings.data_dir = data_dir;
    }

    // DATABASE_URL environment variable takes highest precedence
    if let Some(url) = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()) {
        tracing::debug!("Using DATABASE_URL from environment: {}", url);
        settings.database_url = Some(url);
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seedwatch.toml");
        fs::write(
            &path,
            r#"
data_dir = "data"
request_timeout = 20

[spiders.yts]
last_hours = 24
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.request_timeout, Some(20));
        let yts = config.spider("yts");
        assert_eq!(yts.last_hours, Some(24));
        assert!(yts.enabled);
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("seedwatch.yml");
        fs::write(&yaml, "spiders:\n  yts:\n    enabled: false\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert!(!config.spider("yts").enabled);

        let json = dir.path().join("seedwatch.json");
        fs::write(&json, r#"{"user_agent": "impersonate"}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("impersonate"));
    }

    #[tokio::test]
    async fn test_parse_error_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "request_timeout = \"soon\"").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_apply_to_settings() {
        let config = Config {
            data_dir: Some("crawl".to_string()),
            database: Some("catalog.db".to_string()),
            idle_interval_secs: Some(60),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/srv"));

        assert_eq!(settings.data_dir, PathBuf::from("/srv/crawl"));
        assert_eq!(settings.database_path(), PathBuf::from("/srv/crawl/catalog.db"));
        assert_eq!(settings.database_url(), "sqlite:/srv/crawl/catalog.db");
        assert_eq!(settings.idle_interval(), Duration::from_secs(60));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let spider = SpiderConfig {
            base_url: Some("http://localhost:8080".to_string()),
            ..Default::default()
        };
        assert_eq!(spider.base_url_or("https://yts.mx/"), "http://localhost:8080/");
        assert_eq!(SpiderConfig::default().base_url_or("https://yts.mx/"), "https://yts.mx/");
    }

    #[tokio::test]
    async fn test_discovery_next_to_data_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("seedwatch.json"), r#"{"request_timeout": 3}"#).unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(config.request_timeout, Some(3));
        assert_eq!(settings.request_timeout, 3);
        assert_eq!(settings.data_dir, dir.path());
    }

    #[tokio::test]
    async fn test_oversized_watermark_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seedwatch.toml");
        fs::write(&path, "[spiders.yts]\nlast_hours = 4294967295\n").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("spiders.yts.last_hours"));
    }

    #[tokio::test]
    async fn test_discover_returns_loaded_or_default_config() {
        let config = Config::discover().await.unwrap();
        if config.source_path.is_none() {
            assert_eq!(config, Config::default());
        }
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let result = load_settings_with_options(LoadOptions {
            config_path: Some(dir.path().join("nope.toml")),
            ..Default::default()
        })
        .await;
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

//! Name-keyed collection of spiders.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Spider, SpiderError, Yts};
use crate::config::{Config, Settings};
use crate::services::TorrentService;

/// Spiders available to the scheduler, keyed by name.
#[derive(Clone, Default)]
pub struct SpiderRegistry {
    spiders: BTreeMap<String, Arc<dyn Spider>>,
}

impl SpiderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of every spider enabled in `config`.
    pub fn from_config(
        config: &Config,
        settings: &Settings,
        service: Arc<dyn TorrentService>,
    ) -> Result<Self, SpiderError> {
        let mut registry = Self::new();

        let yts = config.spider(Yts::NAME);
        if yts.enabled {
            registry.register(Arc::new(Yts::from_config(&yts, settings, service)?));
        }

        Ok(registry)
    }

    /// Register a spider, replacing any spider with the same name.
    pub fn register(&mut self, spider: Arc<dyn Spider>) {
        self.spiders.insert(spider.name().to_string(), spider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Spider>> {
        self.spiders.get(name).cloned()
    }

    /// Spider names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.spiders.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Spider>> {
        self.spiders.values()
    }

    pub fn is_empty(&self) -> bool {
        self.spiders.is_empty()
    }
}

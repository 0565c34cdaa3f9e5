//! Cache builder
//!
//! Collects configuration, validates it once, and produces a
//! [`SampleCache`].

use crate::cache::SampleCache;
use crate::config::{CacheConfig, StalenessPolicy};
use crate::error::Result;
use std::path::PathBuf;

/// Builder for a [`SampleCache`] with validated configuration.
#[derive(Debug)]
pub struct CacheBuilder {
    config: CacheConfig,
    config_path: Option<PathBuf>,
}

impl CacheBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            config_path: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON (or, with the `toml` feature, TOML)
    /// file at build time. Takes precedence over [`config`](Self::config).
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn staleness(mut self, policy: StalenessPolicy) -> Self {
        self.config = self.config.clone().with_staleness(policy);
        self
    }

    pub fn entity_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.clone().with_entity_capacity(capacity);
        self
    }

    /// Build the cache.
    pub fn build<S>(self) -> Result<SampleCache<S>> {
        let config = match self.config_path {
            Some(path) => CacheConfig::from_file(path)?,
            None => self.config,
        };
        SampleCache::with_config(config)
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

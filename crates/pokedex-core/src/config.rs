//! Application configuration management.
//!
//! Configuration is stored at `~/.config/pokedex/config.json`. Every field is
//! optional in the file; missing fields take their defaults. The API base URL
//! can also be overridden with the `POKEDEX_API_URL` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::cache::TimedCache;
use crate::fetcher::{
    FetchMode, ResourceFetcher, RetryPolicy, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS,
};
use crate::storage::{FileStore, Storage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "pokedex";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides `api_base_url`
pub const API_URL_ENV: &str = "POKEDEX_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    /// Serve entity details from a fresh cache entry without asking the API.
    pub prefer_cache: bool,
    /// Where the store lives; the platform cache directory when unset.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            prefer_cache: false,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            debug!(url = %url, "API base URL overridden from environment");
            self.api_base_url = url.trim().to_string();
        }
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn fetch_mode(&self) -> FetchMode {
        if self.prefer_cache {
            FetchMode::CacheFirst
        } else {
            FetchMode::NetworkFirst
        }
    }

    /// Open the on-disk store under the cache directory.
    pub fn open_storage(&self) -> Result<Storage> {
        let dir = self.cache_dir()?.join("store");
        Ok(Storage::new(FileStore::new(dir)?))
    }

    /// Fetcher wired to this config's API, retry policy and mode.
    pub fn build_fetcher(&self, storage: Storage) -> Result<ResourceFetcher> {
        let api = ApiClient::with_options(
            &self.api_base_url,
            Duration::from_secs(self.request_timeout_secs),
        )?;
        Ok(ResourceFetcher::new(api, TimedCache::new(storage))
            .with_retry_policy(self.retry_policy())
            .with_mode(self.fetch_mode()))
    }
}

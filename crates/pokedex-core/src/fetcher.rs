//! Resource fetching with caching, retry and stale fallback.
//!
//! `ResourceFetcher` is the only place that decides between cache and
//! network:
//!
//! - Entity details go to the network first. Rate limiting (429), server
//!   errors (5xx) and connectivity failures are retried with exponential
//!   backoff. When every attempt fails, any cached copy is served regardless
//!   of age and marked as a fallback.
//! - List pages are served from cache for ten minutes, otherwise fetched
//!   once. A failed page load is returned as an error; there is no retry and
//!   no fallback for pages.

use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::cache::{MaxAge, TimedCache};
use crate::models::{PageDescriptor, Pokemon, PokemonPage};

// ============================================================================
// Constants
// ============================================================================

/// Entity details barely change, so a day-old copy is still considered fresh.
pub const DETAIL_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24);

/// The upstream list can change, so pages go stale after ten minutes.
pub const LIST_MAX_AGE: Duration = Duration::from_secs(60 * 10);

/// Retries after the first failed entity request.
pub const DEFAULT_RETRIES: u32 = 2;

/// Delay before the first retry.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 700;

/// Each retry waits this much longer than the previous one.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.8;

// ============================================================================
// Retry policy
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, initial_delay: Duration) -> Self {
        Self {
            retries,
            initial_delay,
            ..Self::default()
        }
    }

    /// Delay after `current`, rounded to the millisecond.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let millis = (current.as_millis() as f64 * self.backoff_factor).round();
        Duration::from_millis(millis as u64)
    }

    /// Every delay slept when all attempts fail, in order.
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::with_capacity(self.retries as usize);
        let mut delay = self.initial_delay;
        for _ in 0..self.retries {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}

// ============================================================================
// Results
// ============================================================================

/// Where entity lookups look first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Always ask the API; the cache is only a fallback.
    #[default]
    NetworkFirst,
    /// Serve entries younger than `DETAIL_MAX_AGE` without a request.
    CacheFirst,
}

/// Data plus where it came from.
///
/// `fallback` means the network path failed and a stale cached copy was
/// substituted. Callers should show that differently from a fresh result.
#[derive(Debug)]
pub struct FetchResult<T> {
    pub data: T,
    pub from_cache: bool,
    pub fallback: bool,
    pub original_error: Option<ApiError>,
}

impl<T> FetchResult<T> {
    fn fresh(data: T) -> Self {
        Self {
            data,
            from_cache: false,
            fallback: false,
            original_error: None,
        }
    }

    fn cached(data: T) -> Self {
        Self {
            data,
            from_cache: true,
            fallback: false,
            original_error: None,
        }
    }

    fn stale_fallback(data: T, error: ApiError) -> Self {
        Self {
            data,
            from_cache: true,
            fallback: true,
            original_error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.fallback
    }
}

/// Trimmed, lowercase identifier, or `None` when nothing is left.
/// Callers validate user input with this before calling `fetch_entity`.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

pub fn entity_cache_key(normalized: &str) -> String {
    format!("entity_{}", normalized)
}

// ============================================================================
// Fetcher
// ============================================================================

/// Clone is cheap; clones share the HTTP connection pool and cache lock.
#[derive(Debug, Clone)]
pub struct ResourceFetcher {
    api: ApiClient,
    cache: TimedCache,
    retry: RetryPolicy,
    mode: FetchMode,
}

impl ResourceFetcher {
    pub fn new(api: ApiClient, cache: TimedCache) -> Self {
        Self {
            api,
            cache,
            retry: RetryPolicy::default(),
            mode: FetchMode::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache(&self) -> &TimedCache {
        &self.cache
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch an entity with the fetcher's default retry policy.
    pub async fn fetch_entity(&self, identifier: &str) -> Result<FetchResult<Pokemon>, ApiError> {
        self.fetch_entity_with(identifier, &self.retry).await
    }

    pub async fn fetch_entity_with(
        &self,
        identifier: &str,
        policy: &RetryPolicy,
    ) -> Result<FetchResult<Pokemon>, ApiError> {
        let normalized = identifier.trim().to_lowercase();
        let key = entity_cache_key(&normalized);

        if self.mode == FetchMode::CacheFirst {
            if let Some(data) = self.cache.get(&key, MaxAge::Within(DETAIL_MAX_AGE)) {
                debug!(identifier = %normalized, "Entity served from cache");
                return Ok(FetchResult::cached(data));
            }
        }

        match self.request_entity(&normalized, policy).await {
            Ok(data) => {
                self.cache.put(&key, &data);
                Ok(FetchResult::fresh(data))
            }
            Err(err) => match self.cache.get(&key, MaxAge::Any) {
                Some(data) => {
                    warn!(
                        identifier = %normalized,
                        error = %err,
                        "Entity fetch failed, serving stale cache"
                    );
                    Ok(FetchResult::stale_fallback(data, err))
                }
                None => Err(err),
            },
        }
    }

    /// Request an entity, retrying transient failures with backoff.
    async fn request_entity(&self, identifier: &str, policy: &RetryPolicy) -> Result<Pokemon, ApiError> {
        let mut delays = policy.delays().into_iter();
        let mut attempt = 1u32;

        loop {
            match self.api.fetch_pokemon(identifier).await {
                Ok(data) => {
                    if attempt > 1 {
                        debug!(identifier, attempt, "Entity fetch succeeded after retry");
                    }
                    return Ok(data);
                }
                Err(err) if err.is_retryable() => {
                    let Some(delay) = delays.next() else {
                        return Err(err);
                    };
                    warn!(
                        identifier,
                        attempt,
                        status = ?err.status(),
                        backoff_ms = delay.as_millis() as u64,
                        "Transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Fetch a list page: fresh cache or one request, nothing else.
    pub async fn fetch_page(&self, page: PageDescriptor) -> Result<FetchResult<PokemonPage>, ApiError> {
        let key = page.cache_key();
        if let Some(data) = self.cache.get(&key, MaxAge::Within(LIST_MAX_AGE)) {
            debug!(offset = page.offset, limit = page.limit, "Page served from cache");
            return Ok(FetchResult::cached(data));
        }

        let data = self.api.fetch_pokemon_page(page).await?;
        self.cache.put(&key, &data);
        Ok(FetchResult::fresh(data))
    }

    /// How long ago the cached copy of an entity was saved, for display.
    pub fn entity_cache_age(&self, identifier: &str) -> Option<String> {
        let normalized = normalize_identifier(identifier)?;
        self.cache
            .entry(&entity_cache_key(&normalized))
            .map(|entry| entry.age_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use crate::storage::Storage;
    use chrono::Utc;
    use serde_json::json;

    /// Nothing listens on the discard port, so every request fails to connect.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn offline_fetcher() -> ResourceFetcher {
        let api = ApiClient::with_options(UNREACHABLE, Duration::from_secs(2)).unwrap();
        ResourceFetcher::new(api, TimedCache::new(Storage::in_memory()))
            .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(1)))
    }

    fn pikachu() -> serde_json::Value {
        json!({"id": 25, "name": "pikachu", "height": 4, "weight": 60, "types": [], "abilities": []})
    }

    #[test]
    fn test_default_policy_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delays(),
            vec![Duration::from_millis(700), Duration::from_millis(1260)]
        );
        assert_eq!(
            policy.next_delay(Duration::from_millis(1260)),
            Duration::from_millis(2268)
        );
    }

    #[test]
    fn test_zero_retries_has_no_delays() {
        assert!(RetryPolicy::new(0, Duration::from_millis(700)).delays().is_empty());
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  Pikachu \n").as_deref(), Some("pikachu"));
        assert_eq!(normalize_identifier("25").as_deref(), Some("25"));
        assert!(normalize_identifier("   ").is_none());
        assert!(normalize_identifier("").is_none());
    }

    #[test]
    fn test_entity_cache_key() {
        assert_eq!(entity_cache_key("pikachu"), "entity_pikachu");
    }

    #[tokio::test]
    async fn test_unreachable_network_without_cache_propagates_error() {
        let fetcher = offline_fetcher();
        let err = fetcher.fetch_entity("pikachu").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_unreachable_network_falls_back_to_stale_entry() {
        let fetcher = offline_fetcher();
        fetcher.cache().put_entry(
            "entity_pikachu",
            CacheEntry {
                data: pikachu(),
                saved_at: Utc::now() - chrono::Duration::days(30),
            },
        );

        let result = fetcher.fetch_entity(" PIKACHU ").await.unwrap();

        assert!(result.from_cache);
        assert!(result.is_degraded());
        assert_eq!(result.data.id, 25);
        assert!(matches!(result.original_error, Some(ApiError::Network(_))));
        assert_eq!(fetcher.entity_cache_age("pikachu").as_deref(), Some("30d ago"));
    }

    #[tokio::test]
    async fn test_cache_first_skips_network_for_fresh_entry() {
        let fetcher = offline_fetcher().with_mode(FetchMode::CacheFirst);
        fetcher.cache().put("entity_pikachu", &pikachu());

        let result = fetcher.fetch_entity("pikachu").await.unwrap();

        assert!(result.from_cache);
        assert!(!result.fallback);
        assert!(result.original_error.is_none());
    }

    #[tokio::test]
    async fn test_page_failure_does_not_fall_back() {
        let fetcher = offline_fetcher();
        let page = PageDescriptor::new(0, 24);
        fetcher.cache().put_entry(
            &page.cache_key(),
            CacheEntry {
                data: json!({"count": 1, "results": [{"name": "bulbasaur", "url": ""}]}),
                saved_at: Utc::now() - chrono::Duration::minutes(11),
            },
        );

        assert!(fetcher.fetch_page(page).await.is_err());
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::Storage;

/// Store key holding the whole cache map.
pub const CACHE_STORE_KEY: &str = "pkdx_cache_v1";

/// How old a cached value a reader will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAge {
    Within(Duration),
    /// Any age at all; used for stale fallback.
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    #[serde(rename = "savedAt", with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }

    /// Time since the entry was saved. Entries from the future count as brand new.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.saved_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.saved_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_within(&self, max_age: MaxAge) -> bool {
        match max_age {
            MaxAge::Any => true,
            MaxAge::Within(limit) => self.age() <= limit,
        }
    }
}

type CacheMap = HashMap<String, CacheEntry>;

/// Time-stamped cache persisted as one blob in the key-value store.
///
/// Clone is cheap and clones share the write lock, so concurrent `put`s from
/// different tasks never lose each other's entries.
#[derive(Debug, Clone)]
pub struct TimedCache {
    storage: Storage,
    write_lock: Arc<Mutex<()>>,
}

impl TimedCache {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Missing or malformed blobs read as an empty cache.
    fn load_all(&self) -> CacheMap {
        self.storage.read_json(CACHE_STORE_KEY).unwrap_or_default()
    }

    /// Store `data` under `key` stamped with the current time.
    ///
    /// Persistence failures are logged and otherwise ignored.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.put_entry(key, CacheEntry::new(value)),
            Err(e) => warn!(key, error = %e, "Failed to encode value for cache"),
        }
    }

    pub(crate) fn put_entry(&self, key: &str, entry: CacheEntry) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.load_all();
        entries.insert(key.to_string(), entry);
        if self.storage.write_json(CACHE_STORE_KEY, &entries) {
            debug!(key, entries = entries.len(), "Cached value");
        }
    }

    /// Cached value for `key` if it is young enough and decodes as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, max_age: MaxAge) -> Option<T> {
        let entry = self.entry(key)?;
        if !entry.is_within(max_age) {
            debug!(key, age_secs = entry.age().as_secs(), "Cache entry too old");
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Cache entry has unexpected shape");
                None
            }
        }
    }

    /// Raw entry regardless of age, for showing when data was saved.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.load_all().remove(key)
    }

    pub fn len(&self) -> usize {
        self.load_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use chrono::Duration as ChronoDuration;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "pikachu".to_string(),
            value: 25,
        }
    }

    fn aged_entry(data: serde_json::Value, age: ChronoDuration) -> CacheEntry {
        CacheEntry {
            data,
            saved_at: Utc::now() - age,
        }
    }

    #[test]
    fn test_put_then_get_returns_value() {
        let cache = TimedCache::new(Storage::in_memory());
        cache.put("entity_pikachu", &sample());

        let got: Option<TestData> =
            cache.get("entity_pikachu", MaxAge::Within(Duration::from_secs(1)));
        assert_eq!(got, Some(sample()));
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let cache = TimedCache::new(Storage::in_memory());
        let got: Option<TestData> = cache.get("entity_missingno", MaxAge::Any);
        assert!(got.is_none());
    }

    #[test]
    fn test_old_entry_is_rejected_unless_any_age() {
        let cache = TimedCache::new(Storage::in_memory());
        cache.put_entry(
            "page_0_24",
            aged_entry(json!({"name": "bulbasaur", "value": 1}), ChronoDuration::minutes(11)),
        );

        let fresh: Option<TestData> =
            cache.get("page_0_24", MaxAge::Within(Duration::from_secs(600)));
        assert!(fresh.is_none());

        let stale: Option<TestData> = cache.get("page_0_24", MaxAge::Any);
        assert_eq!(stale.map(|d| d.value), Some(1));
    }

    #[test]
    fn test_entry_inside_window_is_returned() {
        let cache = TimedCache::new(Storage::in_memory());
        cache.put_entry(
            "entity_eevee",
            aged_entry(json!({"name": "eevee", "value": 133}), ChronoDuration::hours(23)),
        );

        let got: Option<TestData> =
            cache.get("entity_eevee", MaxAge::Within(Duration::from_secs(24 * 60 * 60)));
        assert_eq!(got.map(|d| d.value), Some(133));
    }

    #[test]
    fn test_corrupt_blob_reads_empty_and_recovers() {
        let storage = Storage::in_memory();
        storage.write_raw(CACHE_STORE_KEY, "]]garbage").unwrap();
        let cache = TimedCache::new(storage);

        assert!(cache.get::<TestData>("entity_pikachu", MaxAge::Any).is_none());
        assert!(cache.is_empty());

        cache.put("entity_pikachu", &sample());
        assert_eq!(cache.get("entity_pikachu", MaxAge::Any), Some(sample()));
    }

    #[test]
    fn test_wrong_shape_is_none() {
        let cache = TimedCache::new(Storage::in_memory());
        cache.put("entity_pikachu", &json!(["not", "an", "object"]));
        assert!(cache.get::<TestData>("entity_pikachu", MaxAge::Any).is_none());
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let cache = TimedCache::new(Storage::in_memory());
        cache.put_entry(
            "entity_ditto",
            aged_entry(json!({"name": "old", "value": 1}), ChronoDuration::days(3)),
        );
        cache.put("entity_ditto", &json!({"name": "new", "value": 2}));

        let entry = cache.entry("entity_ditto").unwrap();
        assert_eq!(entry.data["name"], "new");
        assert_eq!(entry.age_display(), "just now");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_saved_at_serializes_as_epoch_millis() {
        let entry = CacheEntry::new(json!(1));
        let encoded = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            encoded["savedAt"].as_i64(),
            Some(entry.saved_at.timestamp_millis())
        );
    }

    #[test]
    fn test_age_display() {
        let minutes = aged_entry(json!(null), ChronoDuration::minutes(5));
        assert_eq!(minutes.age_display(), "5m ago");

        let hours = aged_entry(json!(null), ChronoDuration::minutes(95));
        assert_eq!(hours.age_display(), "2h ago");

        let days = aged_entry(json!(null), ChronoDuration::hours(25));
        assert_eq!(days.age_display(), "1d ago");

        let future = aged_entry(json!(null), ChronoDuration::minutes(-10));
        assert_eq!(future.age_display(), "just now");
        assert_eq!(future.age(), Duration::ZERO);
    }

    #[test]
    fn test_cache_survives_reopen_on_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store_dir = temp_dir.path().join("cache");

        let first = TimedCache::new(Storage::new(FileStore::new(store_dir.clone()).unwrap()));
        first.put("entity_mew", &sample());

        let second = TimedCache::new(Storage::new(FileStore::new(store_dir).unwrap()));
        assert_eq!(second.get("entity_mew", MaxAge::Any), Some(sample()));
    }

    #[test]
    fn test_concurrent_puts_keep_every_key() {
        let cache = TimedCache::new(Storage::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.put(&format!("entity_{}", i), &i))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
    }
}

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Total bytes a store may hold.
/// Browsers give an origin a few megabytes of local storage; we keep the same ceiling.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Called with the key and the error whenever a write is dropped.
pub type PersistenceObserver = Arc<dyn Fn(&str, &anyhow::Error) + Send + Sync>;

/// A synchronous string-keyed, string-valued store.
///
/// Writes replace the whole value for a key; a reader sees either the old or
/// the new value, never a mix.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        bail!("Invalid storage key: {:?}", key);
    }
    Ok(())
}

// ============================================================================
// File-backed store
// ============================================================================

/// Stores each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: u64,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
        Ok(Self {
            dir,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        })
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Bytes held by every stored value other than `key`.
    fn used_bytes_excluding(&self, key: &str) -> Result<u64> {
        let skip = format!("{}.json", key);
        let mut total = 0;
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list store directory: {}", self.dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name == skip || !name.ends_with(".json") {
                continue;
            }
            total += entry.metadata()?.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store value: {}", key))?;
        Ok(Some(contents))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        let needed = self.used_bytes_excluding(key)? + value.len() as u64;
        if needed > self.quota_bytes {
            bail!(
                "Storage quota exceeded writing {}: {} of {} bytes",
                key,
                needed,
                self.quota_bytes
            );
        }

        // Write beside the target and rename over it so the swap is atomic
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write store value: {}", key))?;
        std::fs::rename(&tmp, self.value_path(key))
            .with_context(|| format!("Failed to replace store value: {}", key))?;
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = (used + value.len()) as u64;
            if needed > quota {
                bail!(
                    "Storage quota exceeded writing {}: {} of {} bytes",
                    key,
                    needed,
                    quota
                );
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// JSON helpers
// ============================================================================

/// Shared handle to a store with JSON read/write helpers.
///
/// Reads never fail: missing, unreadable and unparsable values all come back
/// as `None`. Writes never fail either: an error is logged, handed to the
/// observer if one is set, and reported as `false`.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    observer: Option<PersistenceObserver>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            observer: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn with_observer(mut self, observer: PersistenceObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.read(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(key, error = %e, "Ignoring unparsable stored value");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!(key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .context("Failed to serialize value")
            .and_then(|json| self.backend.write(key, &json));

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Failed to persist value");
                if let Some(ref observer) = self.observer {
                    observer(key, &e);
                }
                false
            }
        }
    }

    /// Write a raw string, bypassing JSON encoding. Used to seed corrupt data in tests.
    #[cfg(test)]
    pub(crate) fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        self.backend.write(key, value)
    }
}

// ============================================================================
// Tests
// ============================================================================

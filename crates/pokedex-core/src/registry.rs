//! Recent searches and favorites.
//!
//! Both are bounded, ordered, de-duplicated name lists persisted as JSON
//! arrays in the key-value store. Names are stored lowercase, newest first.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::storage::Storage;

pub const RECENT_STORE_KEY: &str = "pkdx_recent_v1";
pub const FAVORITES_STORE_KEY: &str = "pkdx_fav_v1";

pub const MAX_RECENT: usize = 10;
pub const MAX_FAVORITES: usize = 50;

/// A capped name list backed by one store key.
#[derive(Debug, Clone)]
struct NameList {
    storage: Storage,
    key: &'static str,
    capacity: usize,
    lock: Arc<Mutex<()>>,
}

impl NameList {
    fn new(storage: Storage, key: &'static str, capacity: usize) -> Self {
        Self {
            storage,
            key,
            capacity,
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn load(&self) -> Vec<String> {
        self.storage.read_json(self.key).unwrap_or_default()
    }

    /// Run a read-modify-write cycle under the lock, persisting the result.
    fn update<R>(&self, f: impl FnOnce(&mut Vec<String>) -> R) -> R {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names = self.load();
        let before = names.clone();
        let result = f(&mut names);
        names.truncate(self.capacity);
        if names != before {
            self.storage.write_json(self.key, &names);
        }
        result
    }
}

fn normalize(name: &str) -> Option<String> {
    let name = name.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

// ============================================================================
// Recent
// ============================================================================

/// The last few successfully shown entities.
#[derive(Debug, Clone)]
pub struct RecentRegistry {
    list: NameList,
}

impl RecentRegistry {
    pub fn new(storage: Storage) -> Self {
        Self {
            list: NameList::new(storage, RECENT_STORE_KEY, MAX_RECENT),
        }
    }

    /// Move `name` to the front, dropping the oldest entry past the cap.
    pub fn push_recent(&self, name: &str) {
        let Some(name) = normalize(name) else {
            return;
        };

        self.list.update(|names| {
            if names.first() == Some(&name) {
                return;
            }
            names.retain(|n| n != &name);
            names.insert(0, name);
            debug!(count = names.len(), "Updated recent list");
        });
    }

    pub fn names(&self) -> Vec<String> {
        self.list.load()
    }
}

// ============================================================================
// Favorites
// ============================================================================

#[derive(Debug, Clone)]
pub struct FavoritesRegistry {
    list: NameList,
}

impl FavoritesRegistry {
    pub fn new(storage: Storage) -> Self {
        Self {
            list: NameList::new(storage, FAVORITES_STORE_KEY, MAX_FAVORITES),
        }
    }

    /// Add or remove `name`. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&self, name: &str) -> bool {
        let Some(name) = normalize(name) else {
            return false;
        };

        self.list.update(|names| {
            if let Some(pos) = names.iter().position(|n| n == &name) {
                names.remove(pos);
                false
            } else {
                names.insert(0, name);
                true
            }
        })
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        match normalize(name) {
            Some(name) => self.list.load().contains(&name),
            None => false,
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.list.load()
    }
}

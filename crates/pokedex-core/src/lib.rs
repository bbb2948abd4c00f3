//! Core library for pokedex.
//!
//! Everything below the presentation layer lives here:
//!
//! - `storage`: string-keyed persistent store with corruption-tolerant JSON helpers
//! - `cache`: timed cache layered on the store
//! - `api`: one-shot HTTP calls against PokeAPI and the `ApiError` taxonomy
//! - `fetcher`: cache / retry / stale-fallback logic on top of `api` and `cache`
//! - `registry`: recent searches and favorites
//! - `preferences`: theme and page size
//! - `session`: browse state (current page, filter) owned by the UI
//! - `models`: typed API payloads
//! - `config`: on-disk configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod preferences;
pub mod registry;
pub mod session;
pub mod storage;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::{MaxAge, TimedCache};
pub use config::Config;
pub use fetcher::{FetchMode, FetchResult, ResourceFetcher, RetryPolicy};
pub use models::{NamedResource, PageDescriptor, Pokemon, PokemonPage};
pub use preferences::{Preferences, Theme};
pub use registry::{FavoritesRegistry, RecentRegistry};
pub use session::BrowseSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistenceObserver, Storage};

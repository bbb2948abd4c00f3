//! Persistent key-value storage.
//!
//! This module provides the string-keyed store everything else persists
//! through:
//!
//! - `KeyValueStore`: the backend trait (synchronous, whole-value writes)
//! - `FileStore`: one JSON file per key in a directory, with a size quota
//! - `MemoryStore`: in-process backend for tests and throwaway sessions
//! - `Storage`: JSON helpers that treat unreadable data as absent and never
//!   surface write failures to the caller

pub mod store;

pub use store::{
    FileStore, KeyValueStore, MemoryStore, PersistenceObserver, Storage, DEFAULT_QUOTA_BYTES,
};

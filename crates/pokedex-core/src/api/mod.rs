//! REST API client module for PokeAPI.
//!
//! This module provides the `ApiClient` for single-shot requests against
//! `/pokemon/{identifier}` and `/pokemon?offset=&limit=`, and the `ApiError`
//! type that classifies every failure by HTTP status.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
pub use error::ApiError;

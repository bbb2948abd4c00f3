//! API client for the PokeAPI REST service.
//!
//! Each method performs exactly one HTTP request. Retry, caching and fallback
//! decisions belong to `ResourceFetcher`.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{PageDescriptor, Pokemon, PokemonPage};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Public PokeAPI endpoint
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("pokedex/", env!("CARGO_PKG_VERSION"));

/// API client for PokeAPI.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the public API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if parsed.cannot_be_a_base() {
            bail!("API base URL cannot have paths appended: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor, so the base always accepts segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments.iter().copied());
        }
        url
    }

    /// Check if response is successful, returning a typed error if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, url)))
    }

    // ===== Data Fetching Methods =====

    /// Fetch a single creature by normalized name or numeric id
    pub async fn fetch_pokemon(&self, identifier: &str) -> Result<Pokemon, ApiError> {
        self.get_json(self.endpoint(&["pokemon", identifier])).await
    }

    /// Fetch one page of the full creature list
    pub async fn fetch_pokemon_page(&self, page: PageDescriptor) -> Result<PokemonPage, ApiError> {
        let mut url = self.endpoint(&["pokemon"]);
        url.query_pairs_mut()
            .append_pair("offset", &page.offset.to_string())
            .append_pair("limit", &page.limit.to_string());
        self.get_json(url).await
    }
}

use serde::{Deserialize, Serialize};

use crate::utils::format::id_from_url;

/// An offset/limit slice of the full list. Maps 1:1 to a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageDescriptor {
    pub offset: u32,
    pub limit: u32,
}

impl PageDescriptor {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    pub fn cache_key(&self) -> String {
        format!("page_{}_{}", self.offset, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonPage {
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl NamedResource {
    /// Numeric id taken from the resource URL, or "" when the URL has none.
    pub fn id(&self) -> &str {
        id_from_url(&self.url)
    }
}

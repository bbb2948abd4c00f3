//! Display preferences persisted in the key-value store.

use serde::{Deserialize, Serialize};

use crate::storage::Storage;

pub const THEME_STORE_KEY: &str = "pkdx_theme_v1";
pub const PER_PAGE_STORE_KEY: &str = "pkdx_perpage_v1";

/// Page sizes offered in the list view.
pub const PER_PAGE_OPTIONS: [u32; 4] = [12, 24, 48, 96];
pub const DEFAULT_PER_PAGE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// The option after `current`, wrapping around. Unknown sizes restart the cycle.
pub fn next_per_page(current: u32) -> u32 {
    match PER_PAGE_OPTIONS.iter().position(|&n| n == current) {
        Some(i) => PER_PAGE_OPTIONS[(i + 1) % PER_PAGE_OPTIONS.len()],
        None => PER_PAGE_OPTIONS[0],
    }
}

/// The option before `current`, wrapping around.
pub fn previous_per_page(current: u32) -> u32 {
    let len = PER_PAGE_OPTIONS.len();
    match PER_PAGE_OPTIONS.iter().position(|&n| n == current) {
        Some(i) => PER_PAGE_OPTIONS[(i + len - 1) % len],
        None => PER_PAGE_OPTIONS[len - 1],
    }
}

#[derive(Debug, Clone)]
pub struct Preferences {
    storage: Storage,
}

impl Preferences {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn theme(&self) -> Theme {
        self.storage.read_json(THEME_STORE_KEY).unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.storage.write_json(THEME_STORE_KEY, &theme);
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.theme().toggled();
        self.set_theme(theme);
        theme
    }

    pub fn per_page(&self) -> u32 {
        self.storage
            .read_json::<u32>(PER_PAGE_STORE_KEY)
            .filter(|n| PER_PAGE_OPTIONS.contains(n))
            .unwrap_or(DEFAULT_PER_PAGE)
    }

    /// Returns false and stores nothing for sizes outside `PER_PAGE_OPTIONS`.
    pub fn set_per_page(&self, per_page: u32) -> bool {
        if !PER_PAGE_OPTIONS.contains(&per_page) {
            return false;
        }
        self.storage.write_json(PER_PAGE_STORE_KEY, &per_page)
    }
}

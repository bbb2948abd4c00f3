//! Application state management for the Pokedex TUI.
//!
//! `App` owns the browse session, the registries and the fetcher. Every
//! network call runs in a spawned task and reports back through an mpsc
//! channel drained by `check_background_tasks` on each frame. Detail and page
//! requests carry a generation number so a slow, superseded response never
//! overwrites what the user asked for last.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use pokedex_core::fetcher::normalize_identifier;
use pokedex_core::preferences::{next_per_page, previous_per_page};
use pokedex_core::{
    ApiError, BrowseSession, Config, FavoritesRegistry, FetchResult, NamedResource, Pokemon,
    PokemonPage, Preferences, RecentRegistry, ResourceFetcher, Storage, Theme,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the search input.
/// The longest names upstream are well under this.
pub const MAX_SEARCH_LENGTH: usize = 40;

/// Maximum concurrent requests while warming the cache with favorites.
const WARM_UP_CONCURRENCY: usize = 4;

pub const EMPTY_SEARCH_MESSAGE: &str = "Enter a name or id";
pub const FALLBACK_NOTICE: &str = "Showing cached data (API unavailable right now)";
pub const LIST_ERROR_MESSAGE: &str = "Error loading the list.";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    Filtering,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Panel that receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Recent,
    Favorites,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::List => Focus::Recent,
            Focus::Recent => Focus::Favorites,
            Focus::Favorites => Focus::List,
        }
    }
}

/// What the detail panel shows
#[derive(Debug)]
pub enum DetailView {
    Empty,
    Loading(String),
    Loaded(Box<LoadedDetail>),
    Error(String),
}

#[derive(Debug)]
pub struct LoadedDetail {
    pub pokemon: Pokemon,
    pub from_cache: bool,
    pub fallback: bool,
    /// "5m ago" style age of the cached copy, when served from cache.
    pub cache_age: Option<String>,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from spawned fetch tasks back to the UI loop.
enum FetchMessage {
    Entity {
        generation: u64,
        /// Normalized search term; the cache is keyed by it, not by the returned name.
        identifier: String,
        result: Result<FetchResult<Pokemon>, ApiError>,
    },
    Page {
        generation: u64,
        page: u32,
        result: Result<FetchResult<PokemonPage>, ApiError>,
    },
    WarmUp {
        fetched: usize,
        failed: usize,
    },
}

/// Text shown for a failed entity lookup.
pub fn user_message(err: &ApiError) -> String {
    match err.status() {
        Some(404) => "404 - Pokemon not found".to_string(),
        Some(429) => "429 - API rate limit reached. Try again in a few seconds.".to_string(),
        _ => format!("Error: {}", err),
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    fetcher: ResourceFetcher,
    recent: RecentRegistry,
    favorites: FavoritesRegistry,
    pub preferences: Preferences,

    // In-memory copies of the registries; rendering never touches storage
    recent_names: Vec<String>,
    favorite_names: Vec<String>,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub theme: Theme,
    pub search_query: String,
    pub filter_input: String,
    pub session: BrowseSession,
    pub detail: DetailView,

    // Selection indices
    pub list_selection: usize,
    pub recent_selection: usize,
    pub favorites_selection: usize,

    // List loading state
    pub list_loading: bool,
    pub list_error: Option<String>,
    pub list_from_cache: bool,

    pub warming_up: bool,
    pub status_message: Option<String>,

    /// Set by the storage observer when a write is dropped
    persistence_failed: Arc<AtomicBool>,

    detail_generation: u64,
    page_generation: u64,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchMessage>,
    fetch_tx: mpsc::Sender<FetchMessage>,
}

impl App {
    /// Create the app with the on-disk store from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let storage = match config.open_storage() {
            Ok(storage) => storage,
            Err(e) => {
                warn!(error = %e, "Failed to open store, nothing will persist this session");
                Storage::in_memory()
            }
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let persistence_failed = Arc::new(AtomicBool::new(false));
        let flag = persistence_failed.clone();
        let storage = storage.with_observer(Arc::new(move |key: &str, err: &anyhow::Error| {
            debug!(key, error = %err, "Write dropped");
            flag.store(true, Ordering::Relaxed);
        }));

        let fetcher = config.build_fetcher(storage.clone())?;
        let preferences = Preferences::new(storage.clone());
        let theme = preferences.theme();
        let session = BrowseSession::new(preferences.per_page());
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let recent = RecentRegistry::new(storage.clone());
        let favorites = FavoritesRegistry::new(storage);
        let recent_names = recent.names();
        let favorite_names = favorites.names();

        debug!(
            base_url = %config.api_base_url,
            mode = ?config.fetch_mode(),
            per_page = session.per_page,
            "App configured"
        );

        Ok(Self {
            config,
            fetcher,
            recent,
            favorites,
            preferences,
            recent_names,
            favorite_names,

            state: AppState::Normal,
            focus: Focus::List,
            theme,
            search_query: String::new(),
            filter_input: String::new(),
            session,
            detail: DetailView::Empty,

            list_selection: 0,
            recent_selection: 0,
            favorites_selection: 0,

            list_loading: false,
            list_error: None,
            list_from_cache: false,

            warming_up: false,
            status_message: None,
            persistence_failed,

            detail_generation: 0,
            page_generation: 0,

            fetch_rx: rx,
            fetch_tx: tx,
        })
    }

    pub fn persistence_failed(&self) -> bool {
        self.persistence_failed.load(Ordering::Relaxed)
    }

    /// Recently viewed names, most recent first.
    pub fn recent_names(&self) -> &[String] {
        &self.recent_names
    }

    pub fn favorite_names(&self) -> &[String] {
        &self.favorite_names
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorite_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Helper to send fetch results, logging any channel errors
    async fn send_message(tx: &mpsc::Sender<FetchMessage>, message: FetchMessage) {
        if let Err(e) = tx.send(message).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    // =========================================================================
    // Entity lookup
    // =========================================================================

    /// Look up an entity by name or id and show it in the detail panel.
    pub fn search(&mut self, term: &str) {
        let Some(identifier) = normalize_identifier(term) else {
            self.detail = DetailView::Error(EMPTY_SEARCH_MESSAGE.to_string());
            return;
        };

        self.detail_generation += 1;
        let generation = self.detail_generation;
        self.detail = DetailView::Loading(identifier.clone());

        let fetcher = self.fetcher.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_entity(&identifier).await;
            let message = FetchMessage::Entity {
                generation,
                identifier,
                result,
            };
            Self::send_message(&tx, message).await;
        });
    }

    pub fn submit_search(&mut self) {
        let term = std::mem::take(&mut self.search_query);
        self.state = AppState::Normal;
        self.search(&term);
    }

    /// Name under the cursor in the focused panel.
    pub fn selected_name(&self) -> Option<String> {
        match self.focus {
            Focus::List => self
                .session
                .visible_items()
                .get(self.list_selection)
                .map(|item| item.name.clone()),
            Focus::Recent => self.recent_names.get(self.recent_selection).cloned(),
            Focus::Favorites => self.favorite_names.get(self.favorites_selection).cloned(),
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(name) = self.selected_name() {
            self.search(&name);
        }
    }

    pub fn shown_pokemon(&self) -> Option<&Pokemon> {
        match &self.detail {
            DetailView::Loaded(detail) => Some(&detail.pokemon),
            _ => None,
        }
    }

    pub fn toggle_favorite_shown(&mut self) {
        let Some(name) = self.shown_pokemon().map(|p| p.name.clone()) else {
            self.status_message = Some("Open a Pokemon first".to_string());
            return;
        };

        let added = self.toggle_favorite(&name);
        let verb = if added { "Added to" } else { "Removed from" };
        self.status_message = Some(format!("{} favorites: {}", verb, name));
    }

    /// Toggle `name` in the favorites registry. Returns true when added.
    pub fn toggle_favorite(&mut self, name: &str) -> bool {
        let added = self.favorites.toggle_favorite(name);
        self.favorite_names = self.favorites.names();
        let len = self.favorite_names.len();
        self.favorites_selection = self.favorites_selection.min(len.saturating_sub(1));
        added
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Load `page` of the list in the background.
    pub fn load_page(&mut self, page: u32) {
        self.page_generation += 1;
        let generation = self.page_generation;
        let descriptor = self.session.descriptor_for(page.max(1));
        self.list_loading = true;
        self.list_error = None;

        let fetcher = self.fetcher.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_page(descriptor).await;
            Self::send_message(&tx, FetchMessage::Page { generation, page, result }).await;
        });
    }

    pub fn reload_page(&mut self) {
        self.load_page(self.session.page);
    }

    pub fn next_page(&mut self) {
        let page = self.session.next_page();
        if page != self.session.page {
            self.load_page(page);
        }
    }

    pub fn previous_page(&mut self) {
        let page = self.session.previous_page();
        if page != self.session.page {
            self.load_page(page);
        }
    }

    pub fn first_page(&mut self) {
        if self.session.page != 1 {
            self.load_page(1);
        }
    }

    pub fn last_page(&mut self) {
        let last = self.session.total_pages();
        if self.session.page != last {
            self.load_page(last);
        }
    }

    /// Step through the page size options and reload.
    pub fn cycle_per_page(&mut self, forward: bool) {
        let per_page = if forward {
            next_per_page(self.session.per_page)
        } else {
            previous_per_page(self.session.per_page)
        };
        self.preferences.set_per_page(per_page);
        self.session.set_per_page(per_page);
        self.status_message = Some(format!("{} per page", per_page));
        self.reload_page();
    }

    // =========================================================================
    // Filter, theme, warm-up
    // =========================================================================

    pub fn set_filter(&mut self, text: &str) {
        self.session.set_filter(text);
        self.list_selection = 0;
    }

    pub fn visible_items(&self) -> Vec<&NamedResource> {
        self.session.visible_items()
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.preferences.toggle_theme();
        debug!(theme = self.theme.as_str(), "Theme toggled");
    }

    /// Fetch every favorite so later lookups can fall back to the cache.
    pub fn warm_favorites(&mut self) {
        if self.warming_up {
            return;
        }
        let names = self.favorite_names.clone();
        if names.is_empty() {
            self.status_message = Some("No favorites to cache".to_string());
            return;
        }

        self.warming_up = true;
        self.status_message = Some(format!("Caching {} favorites...", names.len()));
        info!(count = names.len(), "Warming cache with favorites");

        let fetcher = self.fetcher.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let (fetched, failed) = stream::iter(names)
                .map(|name| {
                    let fetcher = fetcher.clone();
                    async move {
                        let result = fetcher.fetch_entity(&name).await;
                        if let Err(ref e) = result {
                            debug!(name = %name, error = %e, "Warm-up fetch failed");
                        }
                        result.is_ok()
                    }
                })
                .buffer_unordered(WARM_UP_CONCURRENCY)
                .fold((0, 0), |(ok, failed), success| async move {
                    if success {
                        (ok + 1, failed)
                    } else {
                        (ok, failed + 1)
                    }
                })
                .await;

            Self::send_message(&tx, FetchMessage::WarmUp { fetched, failed }).await;
        });
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::List => self.session.visible_items().len(),
            Focus::Recent => self.recent_names.len(),
            Focus::Favorites => self.favorite_names.len(),
        }
    }

    fn focused_selection(&mut self) -> &mut usize {
        match self.focus {
            Focus::List => &mut self.list_selection,
            Focus::Recent => &mut self.recent_selection,
            Focus::Favorites => &mut self.favorites_selection,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.focused_len();
        let selection = self.focused_selection();
        if *selection + 1 < len {
            *selection += 1;
        }
    }

    pub fn select_previous(&mut self) {
        let selection = self.focused_selection();
        *selection = selection.saturating_sub(1);
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.fetch_rx.try_recv() {
            self.process_message(message);
        }
    }

    fn process_message(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Entity {
                generation,
                identifier,
                result,
            } => {
                if generation != self.detail_generation {
                    debug!(generation, current = self.detail_generation, "Dropping superseded entity result");
                    return;
                }
                self.detail = match result {
                    Ok(result) => {
                        if result.is_degraded() {
                            warn!(
                                identifier = %identifier,
                                error = ?result.original_error,
                                "Showing cached entity after failed fetch"
                            );
                        }
                        self.recent.push_recent(&result.data.name);
                        self.recent_names = self.recent.names();
                        let cache_age = if result.from_cache {
                            self.fetcher.entity_cache_age(&identifier)
                        } else {
                            None
                        };
                        let fallback = result.is_degraded();
                        DetailView::Loaded(Box::new(LoadedDetail {
                            pokemon: result.data,
                            from_cache: result.from_cache,
                            fallback,
                            cache_age,
                        }))
                    }
                    Err(e) => {
                        debug!(error = %e, "Entity lookup failed");
                        DetailView::Error(user_message(&e))
                    }
                };
            }
            FetchMessage::Page { generation, page, result } => {
                if generation != self.page_generation {
                    debug!(generation, current = self.page_generation, "Dropping superseded page result");
                    return;
                }
                self.list_loading = false;
                match result {
                    Ok(result) => {
                        if result.from_cache {
                            debug!(page, "List page from cache");
                        }
                        self.list_from_cache = result.from_cache;
                        self.session.apply_page(page, result.data);
                        let len = self.session.visible_items().len();
                        self.list_selection = self.list_selection.min(len.saturating_sub(1));
                    }
                    Err(e) => {
                        error!(page, error = %e, "Page load failed");
                        self.list_error = Some(LIST_ERROR_MESSAGE.to_string());
                    }
                }
            }
            FetchMessage::WarmUp { fetched, failed } => {
                self.warming_up = false;
                self.status_message = Some(if failed == 0 {
                    format!("Cached {} favorites", fetched)
                } else {
                    format!("Cached {} favorites, {} failed", fetched, failed)
                });
                info!(fetched, failed, "Favorites warm-up finished");
            }
        }
    }
}

/// Characters accepted in the search and filter inputs.
pub fn is_valid_input_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ' ' || c == '.'
}

// ============================================================================
// Tests
// ============================================================================

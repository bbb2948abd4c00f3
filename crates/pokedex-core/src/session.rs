//! Browse state for the paged list: current page, page size and filter.

use crate::models::{NamedResource, PageDescriptor, PokemonPage};
use crate::preferences::DEFAULT_PER_PAGE;
use crate::utils::contains_ignore_case;

/// Number of page buttons shown around the current page.
pub const PAGE_WINDOW: u32 = 7;

#[derive(Debug, Clone)]
pub struct BrowseSession {
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
    /// Total entities upstream, as reported by the last loaded page.
    pub total: u32,
    pub items: Vec<NamedResource>,
    pub filter: String,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl BrowseSession {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            total: 0,
            items: Vec::new(),
            filter: String::new(),
        }
    }

    pub fn descriptor(&self) -> PageDescriptor {
        self.descriptor_for(self.page)
    }

    pub fn descriptor_for(&self, page: u32) -> PageDescriptor {
        PageDescriptor::new(page.saturating_sub(1) * self.per_page, self.per_page)
    }

    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// Clamp a requested page into `1..=total_pages`.
    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages())
    }

    pub fn next_page(&self) -> u32 {
        self.clamp_page(self.page + 1)
    }

    pub fn previous_page(&self) -> u32 {
        self.clamp_page(self.page.saturating_sub(1))
    }

    /// Page numbers to show as buttons, at most `size` of them, around the current page.
    pub fn page_window(&self, size: u32) -> Vec<u32> {
        let pages = self.total_pages();
        let size = size.max(1);
        let half = size / 2;

        let current = self.page.clamp(1, pages);
        let mut start = current.saturating_sub(half).max(1);
        let end = start.saturating_add(size - 1).min(pages);
        if end + 1 - start < size {
            start = end.saturating_sub(size - 1).max(1);
        }
        (start..=end).collect()
    }

    /// Change the page size, keeping the first visible entity on screen.
    pub fn set_per_page(&mut self, per_page: u32) {
        let first = self.descriptor().offset;
        self.per_page = per_page.max(1);
        self.page = first / self.per_page + 1;
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.trim().to_lowercase();
    }

    pub fn visible_items(&self) -> Vec<&NamedResource> {
        self.items
            .iter()
            .filter(|item| self.filter.is_empty() || contains_ignore_case(&item.name, &self.filter))
            .collect()
    }

    pub fn apply_page(&mut self, page: u32, data: PokemonPage) {
        self.total = data.count;
        // The upstream count may have shrunk since the page was requested
        self.page = self.clamp_page(page);
        self.items = data.results;
    }
}

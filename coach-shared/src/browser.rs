//! View state for the resource directory.
//!
//! [`ResourceBrowser`] owns the immutable catalog plus the three inputs the
//! user controls (query, category, page) and derives everything else from
//! them. All mutation goes through the transition methods, each of which
//! re-derives the filtered subset, so render code only ever reads.

use std::{convert::Infallible, fmt, ops::RangeInclusive, str::FromStr};

use crate::{language::Translator, models::Resource};

/// Resources shown per page.
pub const PAGE_SIZE: usize = 12;

/// Maximum number of page buttons in the pagination window.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Category constraint applied on top of the text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every category.
    #[default]
    All,
    /// Exactly this catalog category.
    Only(String),
}

impl CategoryFilter {
    /// Whether a resource in `category` passes the filter.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(value.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => f.write_str(category),
        }
    }
}

/// Everything needed to draw one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Resources on the current page.
    pub items: Vec<&'a Resource>,
    /// One-based page number.
    pub current_page: usize,
    /// Zero when nothing matches.
    pub total_pages: usize,
    /// Page buttons to show; `None` when pagination is hidden.
    pub window: Option<RangeInclusive<usize>>,
    /// Whether "previous" leads anywhere.
    pub previous_enabled: bool,
    /// Whether "next" leads anywhere.
    pub next_enabled: bool,
}

impl PageView<'_> {
    /// True when the filtered set is empty and the placeholder should show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Search, category filter, and pagination over a loaded catalog.
#[derive(Debug, Clone)]
pub struct ResourceBrowser {
    catalog: Vec<Resource>,
    query: String,
    category: CategoryFilter,
    filtered: Vec<usize>,
    current_page: usize,
}

impl ResourceBrowser {
    /// Starts with no filters on page one.
    #[must_use]
    pub fn new(catalog: Vec<Resource>) -> Self {
        let filtered = (0..catalog.len()).collect();
        Self {
            catalog,
            query: String::new(),
            category: CategoryFilter::All,
            filtered,
            current_page: 1,
        }
    }

    /// The text query as typed.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The active category filter.
    #[must_use]
    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// One-based page number.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Size of the whole catalog.
    #[must_use]
    pub fn total(&self) -> usize {
        self.catalog.len()
    }

    /// Size of the filtered subset.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Matching resources in catalog order.
    pub fn filtered(&self) -> impl Iterator<Item = &Resource> {
        self.filtered.iter().map(|&index| &self.catalog[index])
    }

    /// Replaces the text query and returns to page one.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Replaces the category filter and returns to page one.
    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.refilter();
    }

    /// Drops both filters and returns to page one.
    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.category = CategoryFilter::All;
        self.refilter();
    }

    /// `ceil(filtered / PAGE_SIZE)`; zero when nothing matches.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE)
    }

    /// Moves to `page` if it exists. Out-of-range targets leave the page
    /// unchanged and return `false`.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Advances one page unless already on the last.
    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    /// Goes back one page unless already on the first.
    pub fn previous_page(&mut self) -> bool {
        self.current_page > 1 && self.go_to_page(self.current_page - 1)
    }

    /// Resources on the current page.
    #[must_use]
    pub fn page_items(&self) -> Vec<&Resource> {
        let start = (self.current_page - 1) * PAGE_SIZE;
        self.filtered
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|&index| &self.catalog[index])
            .collect()
    }

    /// Page numbers to offer, centred on the current page where possible.
    #[must_use]
    pub fn page_window(&self) -> Option<RangeInclusive<usize>> {
        let total = self.total_pages();
        if total == 0 {
            return None;
        }
        let span = MAX_PAGE_BUTTONS - 1;
        let mut start = self.current_page.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
        let end = (start + span).min(total);
        if end - start < span {
            start = end.saturating_sub(span).max(1);
        }
        Some(start..=end)
    }

    /// Whether a page precedes the current one.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a page follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Snapshot of the current page for rendering.
    #[must_use]
    pub fn view(&self) -> PageView<'_> {
        let items = self.page_items();
        let window = if items.is_empty() {
            None
        } else {
            self.page_window()
        };
        PageView {
            items,
            current_page: self.current_page,
            total_pages: self.total_pages(),
            window,
            previous_enabled: self.has_previous(),
            next_enabled: self.has_next(),
        }
    }

    /// "Showing 13-24 of 30"; `None` when nothing matches.
    #[must_use]
    pub fn page_info(&self, translator: Translator) -> Option<String> {
        let count = self.filtered.len();
        if count == 0 {
            return None;
        }
        let first = (self.current_page - 1) * PAGE_SIZE + 1;
        let last = (self.current_page * PAGE_SIZE).min(count);
        Some(format!(
            "{} {first}-{last} {} {count}",
            translator.t("showingText"),
            translator.t("ofText"),
        ))
    }

    /// "30 resources available" or "4 of 30 resources found".
    #[must_use]
    pub fn results_summary(&self, translator: Translator) -> String {
        let count = self.filtered.len();
        let total = self.catalog.len();
        if count == total {
            format!("{count} {}", translator.t("resourcesAvailable"))
        } else {
            format!(
                "{count} {} {total} {}",
                translator.t("ofText"),
                translator.t("resourcesFound"),
            )
        }
    }

    fn refilter(&mut self) {
        let needle = self.query.trim().to_lowercase();
        self.filtered = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, resource)| {
                resource.matches_query(&needle) && self.category.matches(&resource.category)
            })
            .map(|(index, _)| index)
            .collect();
        self.current_page = 1;
    }
}

//! Page math for the run table.

use std::ops::Range;

/// Zero-based page cursor over a list of fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    per_page: usize,
}

impl Pager {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 0,
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.per_page)
    }

    /// Item range shown on the current page.
    pub fn bounds(&self, total_items: usize) -> Range<usize> {
        let start = (self.page * self.per_page).min(total_items);
        let end = (start + self.per_page).min(total_items);
        start..end
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self, total_items: usize) -> bool {
        self.page + 1 < self.total_pages(total_items)
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn next(&mut self, total_items: usize) {
        if self.has_next(total_items) {
            self.page += 1;
        }
    }

    pub fn first(&mut self) {
        self.page = 0;
    }

    /// One-line summary for the pagination bar.
    pub fn info(&self, total_items: usize) -> String {
        let total_pages = self.total_pages(total_items);
        if total_pages == 0 {
            return "No runs".to_string();
        }
        let bounds = self.bounds(total_items);
        format!(
            "Page {} of {}  ·  {}–{} of {} runs",
            self.page + 1,
            total_pages,
            bounds.start + 1,
            bounds.end,
            total_items
        )
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(10)
    }
}

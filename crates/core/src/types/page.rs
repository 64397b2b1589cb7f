//! Catalog pagination arithmetic.
//!
//! Contract listings are stored in a 1-based sequential array, so a page
//! is an inclusive id range. All of the arithmetic lives here, away from
//! any RPC concern, so the range logic is testable on its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ListingId;

/// Number of listings shown per catalog page.
pub const LISTINGS_PER_PAGE: u64 = 10;

/// Pagination errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// Pages are 1-based; page 0 does not exist.
    #[error("page numbers start at 1")]
    ZeroPage,
}

/// Inclusive id range covered by one catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    /// First listing id on the page.
    pub start: ListingId,
    /// Last listing id on the page.
    pub end: ListingId,
}

impl PageBounds {
    /// Iterate the raw ids covered by this page, in order.
    pub fn ids(self) -> impl Iterator<Item = ListingId> {
        (self.start.as_u64()..=self.end.as_u64()).map(ListingId::new)
    }
}

/// A resolved catalog page: the requested page clamped against the total
/// listing count known at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    page: u64,
    total_listings: u64,
}

impl CatalogPage {
    /// Resolve a requested page number against the current listing count.
    ///
    /// A request past the last page clamps to the last page; requesting
    /// any page of an empty catalog resolves to page 1 with no bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::ZeroPage`] for page 0.
    pub fn new(page: u64, total_listings: u64) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::ZeroPage);
        }
        let last = total_pages(total_listings).max(1);
        Ok(Self {
            page: page.min(last),
            total_listings,
        })
    }

    /// The resolved (clamped) page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Total number of pages for the current listing count.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        total_pages(self.total_listings)
    }

    /// Total number of listings the page was resolved against.
    #[must_use]
    pub const fn total_listings(&self) -> u64 {
        self.total_listings
    }

    /// The inclusive id range this page covers, or `None` for an empty
    /// catalog.
    #[must_use]
    pub fn bounds(&self) -> Option<PageBounds> {
        if self.total_listings == 0 {
            return None;
        }
        let start = (self.page - 1) * LISTINGS_PER_PAGE + 1;
        let end = (self.page * LISTINGS_PER_PAGE).min(self.total_listings);
        Some(PageBounds {
            start: ListingId::new(start),
            end: ListingId::new(end),
        })
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// `ceil(total / LISTINGS_PER_PAGE)` without floating point.
const fn total_pages(total_listings: u64) -> u64 {
    total_listings.div_ceil(LISTINGS_PER_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_rejected() {
        assert_eq!(CatalogPage::new(0, 25), Err(PageError::ZeroPage));
    }

    #[test]
    fn test_empty_catalog_has_no_bounds() {
        let page = CatalogPage::new(1, 0).expect("resolves");
        assert_eq!(page.total_pages(), 0);
        assert!(page.bounds().is_none());
        assert!(!page.has_prev());
        assert!(!page.has_next());
    }

    #[test]
    fn test_first_page_bounds() {
        let page = CatalogPage::new(1, 25).expect("resolves");
        let bounds = page.bounds().expect("bounds");
        assert_eq!(bounds.start, ListingId::new(1));
        assert_eq!(bounds.end, ListingId::new(10));
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_partial_last_page() {
        let page = CatalogPage::new(3, 25).expect("resolves");
        let bounds = page.bounds().expect("bounds");
        assert_eq!(bounds.start, ListingId::new(21));
        assert_eq!(bounds.end, ListingId::new(25));
        assert!(page.has_prev());
        assert!(!page.has_next());
    }

    #[test]
    fn test_exact_multiple_last_page() {
        let page = CatalogPage::new(2, 20).expect("resolves");
        let bounds = page.bounds().expect("bounds");
        assert_eq!(bounds.start, ListingId::new(11));
        assert_eq!(bounds.end, ListingId::new(20));
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn test_overshoot_clamps_to_last_page() {
        let page = CatalogPage::new(99, 25).expect("resolves");
        assert_eq!(page.page(), 3);
        let bounds = page.bounds().expect("bounds");
        assert_eq!(bounds.start, ListingId::new(21));
    }

    #[test]
    fn test_single_listing() {
        let page = CatalogPage::new(1, 1).expect("resolves");
        let bounds = page.bounds().expect("bounds");
        assert_eq!(bounds.start, ListingId::new(1));
        assert_eq!(bounds.end, ListingId::new(1));
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_ids_iteration_order() {
        let page = CatalogPage::new(2, 13).expect("resolves");
        let ids: Vec<u64> = page
            .bounds()
            .expect("bounds")
            .ids()
            .map(|id| id.as_u64())
            .collect();
        assert_eq!(ids, vec![11, 12, 13]);
    }
}

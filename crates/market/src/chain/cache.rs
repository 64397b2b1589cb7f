//! Cache types for contract read results.

use ddm_core::ListingId;

use super::types::Listing;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// Total listing count.
    Count,
    /// One resolved catalog page.
    Page(u64),
    /// A single listing by id.
    Listing(ListingId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Count(u64),
    Page(Vec<Listing>),
    Listing(Box<Listing>),
}

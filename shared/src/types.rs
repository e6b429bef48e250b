//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Default number of rows per listing page
pub const DEFAULT_ITEMS_PER_PAGE: i64 = 5;

/// Paging metadata for a listing
///
/// `page` is the page the caller asked for, not clamped. Callers compare it
/// against `total_pages` to decide whether to redirect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagingInfo {
    pub page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

impl PagingInfo {
    /// Build paging metadata from a row count and the raw `?page=` value.
    ///
    /// A missing or unparseable page falls back to 1.
    pub fn create(total_items: i64, items_per_page: i64, requested_page: Option<&str>) -> Self {
        let items_per_page = items_per_page.max(1);
        let total_items = total_items.max(0);
        let page = requested_page
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1);

        Self {
            page,
            total_pages: (total_items + items_per_page - 1) / items_per_page,
            total_items,
            items_per_page,
        }
    }

    /// Whether the requested page lies inside `1..=total_pages`
    pub fn is_in_range(&self) -> bool {
        self.page >= 1 && self.page <= self.total_pages
    }

    /// Row offset of the requested page
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.items_per_page
    }
}

/// A page of items plus its paging metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PagingInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_listing_has_no_pages() {
        let info = PagingInfo::create(0, 5, Some("1"));
        assert_eq!(info.total_pages, 0);
        assert_eq!(info.total_items, 0);
        assert!(!info.is_in_range());
    }

    #[test]
    fn test_missing_page_defaults_to_first() {
        assert_eq!(PagingInfo::create(12, 5, None).page, 1);
        assert_eq!(PagingInfo::create(12, 5, Some("abc")).page, 1);
        assert_eq!(PagingInfo::create(12, 5, Some(" 2 ")).page, 2);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PagingInfo::create(10, 5, None).total_pages, 2);
        assert_eq!(PagingInfo::create(11, 5, None).total_pages, 3);
        assert_eq!(PagingInfo::create(1, 5, None).total_pages, 1);
    }

    #[test]
    fn test_out_of_range_pages() {
        assert!(!PagingInfo::create(12, 5, Some("0")).is_in_range());
        assert!(!PagingInfo::create(12, 5, Some("-3")).is_in_range());
        assert!(!PagingInfo::create(12, 5, Some("4")).is_in_range());
        assert!(PagingInfo::create(12, 5, Some("3")).is_in_range());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PagingInfo::create(12, 5, Some("3")).offset(), 10);
        assert_eq!(PagingInfo::create(12, 5, Some("1")).offset(), 0);
    }

    proptest! {
        #[test]
        fn prop_pages_cover_all_items(total in 0i64..10_000, size in 1i64..100) {
            let info = PagingInfo::create(total, size, None);
            prop_assert!(info.total_pages * size >= total);
            prop_assert!((info.total_pages - 1).max(0) * size < total.max(1));
        }

        #[test]
        fn prop_in_range_pages_have_valid_offset(total in 1i64..10_000, size in 1i64..100, page in 1i64..200) {
            let info = PagingInfo::create(total, size, Some(&page.to_string()));
            if info.is_in_range() {
                prop_assert!(info.offset() < total);
            }
        }
    }
}

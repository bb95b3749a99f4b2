//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub page_size: u64,
}

impl Pagination {
    /// Build from raw query values. Missing or non-positive values fall back
    /// to defaults; oversized pages are clamped silently.
    pub fn from_query(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).map(|p| p as u64).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s >= 1)
            .map(|s| (s as u64).min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    /// Clamp to sane defaults and return `(zero_based_page, page_size)`.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let page_size = if self.page_size == 0 { DEFAULT_PAGE_SIZE } else { self.page_size.min(MAX_PAGE_SIZE) };
        (page - 1, page_size)
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        let (idx, size) = self.normalize();
        idx * size
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, page_size: DEFAULT_PAGE_SIZE } }
}

/// One page of results. No total count is computed.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        let (idx, page_size) = pagination.normalize();
        Self { items, page: idx + 1, page_size }
    }

    /// Slice an already ordered in-memory sequence.
    pub fn from_sorted(all: Vec<T>, pagination: Pagination) -> Self {
        let (_, size) = pagination.normalize();
        let items = all.into_iter().skip(pagination.offset() as usize).take(size as usize).collect();
        Self::new(items, pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, page_size: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 20);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, page_size: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.page_size, 20);
    }

    #[test]
    fn from_query_falls_back_and_clamps() {
        assert_eq!(Pagination::from_query(None, None), Pagination::default());
        assert_eq!(Pagination::from_query(Some(-3), Some(0)), Pagination::default());
        assert_eq!(Pagination::from_query(Some(2), Some(500)), Pagination { page: 2, page_size: 100 });
        assert_eq!(Pagination::from_query(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn page_from_sorted_slices() {
        let p = Page::from_sorted((1..=45).collect::<Vec<_>>(), Pagination { page: 3, page_size: 20 });
        assert_eq!(p.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(p.page, 3);
        let empty = Page::from_sorted((1..=5).collect::<Vec<_>>(), Pagination { page: 9, page_size: 20 });
        assert!(empty.items.is_empty());
    }
}

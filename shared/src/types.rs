//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Largest page any list endpoint will return
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size used when the caller gives none
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Pagination parameters.
///
/// Accepts either offset style (`skip`/`take`) or page style (`page`/`page_size`,
/// 1-based); offset style wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub take: Option<i64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Pagination {
    pub fn new(skip: i64, take: i64) -> Self {
        Self {
            skip: Some(skip),
            take: Some(take),
            page: None,
            page_size: None,
        }
    }

    /// Clamped `(offset, limit)` for a SQL query
    pub fn offset_limit(&self) -> (i64, i64) {
        let limit = self
            .take
            .or(self.page_size.map(i64::from))
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let offset = match (self.skip, self.page) {
            (Some(skip), _) => skip,
            (None, Some(page)) => i64::from(page.max(1) - 1) * limit,
            (None, None) => 0,
        };

        (offset.max(0), limit)
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: &Pagination, total_items: i64) -> Self {
        let (skip, take) = pagination.offset_limit();
        Self {
            data,
            pagination: PaginationMeta {
                skip,
                take,
                total_items,
            },
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub skip: i64,
    pub take: i64,
    pub total_items: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Pagination::default().offset_limit(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_skip_take_clamped() {
        assert_eq!(Pagination::new(-5, 1000).offset_limit(), (0, MAX_PAGE_SIZE));
        assert_eq!(Pagination::new(40, 0).offset_limit(), (40, 1));
    }

    #[test]
    fn test_page_style() {
        let p = Pagination {
            page: Some(3),
            page_size: Some(25),
            ..Default::default()
        };
        assert_eq!(p.offset_limit(), (50, 25));

        let first = Pagination {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(first.offset_limit(), (0, DEFAULT_PAGE_SIZE));
    }
}

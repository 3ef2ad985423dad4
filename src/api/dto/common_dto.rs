//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Offset of the first item on this page.
    ///
    /// Widened to `u64` so an absurd `page` saturates past the end of
    /// the result instead of overflowing.
    #[must_use]
    pub fn offset(&self) -> usize {
        let offset = (u64::from(self.page.max(1)) - 1) * u64::from(self.per_page);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }
}

/// Slices one page out of a full result and produces its metadata.
#[must_use]
pub fn paginate<T>(items: Vec<T>, params: &PaginationParams) -> (Vec<T>, PaginationMeta) {
    let params = params.clamped();
    let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(params.per_page)
    };

    let page_items: Vec<T> = items
        .into_iter()
        .skip(params.offset())
        .take(params.per_page as usize)
        .collect();

    (
        page_items,
        PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        },
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn clamped_bounds_page_and_per_page() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        };
        let clamped = params.clamped();
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.per_page, 100);
    }

    #[test]
    fn paginate_slices_and_counts() {
        let items: Vec<u32> = (0..45).collect();
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        let (page, meta) = paginate(items, &params);
        assert_eq!(page, (40..45).collect::<Vec<u32>>());
        assert_eq!(meta.total, 45);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn paginate_survives_maximum_page_number() {
        let (page, meta) = paginate(
            vec![1, 2, 3],
            &PaginationParams {
                page: u32::MAX,
                per_page: 100,
            },
        );
        assert!(page.is_empty());
        assert_eq!(meta.page, u32::MAX);
        assert_eq!(meta.total, 3);
    }

    #[test]
    fn paginate_empty_has_zero_pages() {
        let (page, meta) = paginate(Vec::<u32>::new(), &PaginationParams::default());
        assert!(page.is_empty());
        assert_eq!(meta.total_pages, 0);
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page metadata returned next to list results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: u64,
    /// Page size
    pub limit: u64,
    /// Total number of rows across all pages
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u64 = 50;
    pub const MAX_LIMIT: u64 = 500;

    /// Normalizes the requested page and limit. Missing or zero values fall
    /// back to page 1 and the default limit; oversized limits are capped.
    pub fn new(page: Option<u64>, limit: Option<u64>, total: u64) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT);
        let total_pages = total.div_ceil(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Number of rows to skip for the current page. Saturates at
    /// `i64::MAX`, the largest offset SQL backends accept.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(i64::MAX as u64)
    }
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 规范化分页参数，页码从 1 开始，每页条数限制在 [1, MAX_PAGE_SIZE]
pub fn normalize_page(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    (
        page.unwrap_or(1).max(1),
        size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    )
}

// 分页响应信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    pub fn new(page: i64, page_size: i64, total: i64) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: (total + page_size - 1) / page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(normalize_page(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize_page(Some(3), Some(1000)), (3, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PaginationInfo::new(1, 10, 0).total_pages, 0);
        assert_eq!(PaginationInfo::new(1, 10, 10).total_pages, 1);
        assert_eq!(PaginationInfo::new(1, 10, 11).total_pages, 2);
    }
}

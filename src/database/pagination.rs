use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 分页请求参数，已校正到合法范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// 页码至少为 1，每页条数限制在 1..=100
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 分页查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination<T> {
    pub page: i64,
    pub limit: i64,
    pub total_rows: i64,
    pub total_pages: i64,
    pub rows: Vec<T>,
}

impl<T> Pagination<T> {
    pub fn from_rows(page: i64, limit: i64, total_rows: i64, rows: Vec<T>) -> Self {
        let total_pages = if limit > 0 {
            (total_rows + limit - 1) / limit
        } else {
            0
        };

        Self {
            page,
            limit,
            total_rows,
            total_pages,
            rows,
        }
    }

    pub fn from_request(request: PageRequest, total_rows: i64, rows: Vec<T>) -> Self {
        Self::from_rows(request.page, request.limit, total_rows, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_is_clamped() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(
            PageRequest::new(Some(-3), Some(1000)),
            PageRequest { page: 1, limit: 100 }
        );
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn huge_page_numbers_saturate_instead_of_overflowing() {
        assert_eq!(PageRequest::new(Some(i64::MAX), Some(20)).offset(), i64::MAX);
        assert_eq!(
            PageRequest::new(Some(i64::MAX), Some(MAX_PAGE_SIZE)).offset(),
            i64::MAX
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::<()>::from_rows(1, 20, 0, vec![]).total_pages, 0);
        assert_eq!(Pagination::<()>::from_rows(1, 20, 20, vec![]).total_pages, 1);
        assert_eq!(Pagination::<()>::from_rows(1, 20, 21, vec![]).total_pages, 2);
    }
}

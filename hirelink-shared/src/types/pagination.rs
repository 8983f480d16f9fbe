use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 { 1 }
fn default_limit() -> u64 { 20 }

impl PaginationParams {
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.limit()
    }

    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, 100)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

/// List envelope: `{ success, data: [...], pagination: { page, limit, total, pages } }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            success: true,
            data,
            pagination: PageInfo {
                page: params.page,
                limit,
                total,
                pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_from_page() {
        let params = PaginationParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn limit_is_clamped() {
        let params = PaginationParams { page: 1, limit: 500 };
        assert_eq!(params.limit(), 100);
        let params = PaginationParams { page: 1, limit: 0 };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn page_count_rounds_up() {
        let params = PaginationParams { page: 1, limit: 20 };
        let paged = Paginated::new(vec![1, 2, 3], 41, &params);
        assert_eq!(paged.pagination.pages, 3);
        assert!(paged.success);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, &params);
        assert_eq!(empty.pagination.pages, 0);
    }
}

use serde::{Deserialize, Serialize};

/// Sort keys recognized for project member search.
pub const MEMBER_SORT_DISPLAY_NAME: &str = "displayName";
pub const MEMBER_SORT_JOINED_AT: &str = "joinedAt";

pub const ORDER_ASC: &str = "ASC";
pub const ORDER_DESC: &str = "DESC";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationRequest {
    pub page: i64,
    pub page_size: i64,
    pub sort_by: String,
    pub order: String,
}

impl PaginationRequest {
    /// Applies defaults for unset or invalid fields: page 1, page size 100,
    /// sort by display name (recognized: displayName, joinedAt), ascending.
    pub fn normalize_for_member_search(&mut self) {
        if self.page <= 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.page_size <= 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.sort_by.is_empty() || !is_valid_member_sort_by(&self.sort_by) {
            self.sort_by = MEMBER_SORT_DISPLAY_NAME.to_string();
        }
        if self.order.is_empty() {
            self.order = ORDER_ASC.to_string();
        }
    }
}

fn is_valid_member_sort_by(sort_by: &str) -> bool {
    matches!(sort_by, MEMBER_SORT_DISPLAY_NAME | MEMBER_SORT_JOINED_AT)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub page: i64,
    pub page_size: i64,
    pub total_page: i64,
    pub total_item: i64,
}

impl PaginationResponse {
    /// total_page is the ceiling of total_item / page_size.
    pub fn new(page: i64, page_size: i64, total_item: i64) -> Self {
        let total_page = if page_size > 0 {
            (total_item + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            page,
            page_size,
            total_page,
            total_item,
        }
    }
}

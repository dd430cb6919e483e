//! Response envelopes and pagination shared by every list endpoint

use crate::config::PaginationConfig;
use axum::Json;
use serde::{Deserialize, Serialize};

/// `page` / `limit` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A resolved page request: 1-based page and a bounded page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

/// Largest row offset the database accepts (a signed 64-bit OFFSET)
const MAX_OFFSET: u64 = i64::MAX as u64;

impl PageRequest {
    /// `page` is bounded so that `(page - 1) * limit` stays a valid offset
    pub fn new(page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page: page.clamp(1, MAX_OFFSET / limit),
            limit,
        }
    }

    /// Zero-based page index for SeaORM paginators
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

impl PageQuery {
    /// Apply configured defaults and clamp `limit` to the allowed maximum
    pub fn resolve(&self, config: &PaginationConfig) -> PageRequest {
        let limit = self
            .limit
            .unwrap_or(config.default_limit)
            .clamp(1, config.max_limit.max(1));

        PageRequest::new(self.page.unwrap_or(1), limit)
    }
}

/// A page of items together with the total count across all pages
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}

/// `{ success, data }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// `{ success, data, pagination }`
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Wrap a value in the success envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Wrap a page in the paginated success envelope
pub fn paginated<T: Serialize>(page: Page<T>) -> Json<PaginatedResponse<T>> {
    Json(PaginatedResponse {
        success: true,
        pagination: Pagination::new(page.request, page.total),
        data: page.items,
    })
}

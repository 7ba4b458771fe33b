//! Response types for REST handlers
//!
//! Every body, success or failure, is the same envelope:
//!
//! ```json
//! {"success": true, "data": {...}, "meta": {"page": 1, "page_size": 20, "total": 45, "total_pages": 3}}
//! {"success": false, "error": {"code": "NOT_FOUND", "message": "Post not found"}}
//! ```
//!
//! # Example
//!
//! ```rust
//! use cms_service::handlers::{ApiResponse, PaginationMeta};
//! use cms_service::repository::{Page, PageRequest};
//!
//! let page = Page::new(vec!["a", "b"], 45, &PageRequest::default());
//! let meta = PaginationMeta::from_page(&page);
//! assert_eq!(meta.total_pages, 3);
//!
//! let body = ApiResponse::success(page.items).with_meta(meta);
//! assert!(body.success);
//! ```

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::repository::Page;

/// Error part of a failed response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Machine-readable code, e.g. `NOT_FOUND`
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
    /// Total number of items across all pages
    pub total: u64,
    /// Total number of pages; 1 when there are no items
    pub total_pages: u32,
}

impl PaginationMeta {
    #[must_use]
    pub fn from_page<T>(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            total_pages: page.total_pages(),
        }
    }
}

/// The response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: None,
        }
    }

    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: PaginationMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// 200 with a single item
#[derive(Debug, Clone)]
pub struct ItemResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ItemResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(ApiResponse::success(self.0))).into_response()
    }
}

/// 201 with the created item
#[derive(Debug, Clone)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(ApiResponse::success(self.0))).into_response()
    }
}

/// 200 with one page of items and its pagination metadata
#[derive(Debug, Clone)]
pub struct ListResponse<T>(pub Page<T>);

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        let meta = PaginationMeta::from_page(&self.0);
        let body = ApiResponse::success(self.0.items).with_meta(meta);
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// 204 with an empty body
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

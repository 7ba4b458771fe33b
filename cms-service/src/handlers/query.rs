//! Query-string parsing for list operations
//!
//! List endpoints never reject a query string: unparseable values are
//! treated as absent and paging values are clamped.
//!
//! # Example
//!
//! ```rust
//! use cms_service::handlers::ListQuery;
//! use cms_service::models::PostStatus;
//!
//! let query = ListQuery::from_pairs([
//!     ("page", "2"),
//!     ("page_size", "500"),
//!     ("status", "published"),
//!     ("author_id", "not-a-uuid"),
//! ]);
//!
//! let page = query.page_request();
//! assert_eq!((page.page, page.page_size), (2, 100));
//! assert_eq!(query.parse::<PostStatus>("status"), Some(PostStatus::Published));
//! assert_eq!(query.uuid("author_id"), None);
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::repository::PageRequest;

/// Raw query parameters with lenient typed accessors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: HashMap<String, String>,
}

impl ListQuery {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Trimmed value, `None` when absent or blank
    pub fn string(&self, name: &str) -> Option<String> {
        self.params
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parsed value, `None` when absent or unparseable
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.params.get(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn uuid(&self, name: &str) -> Option<Uuid> {
        self.parse(name)
    }

    /// `true` or `1` is true, any other present value is false
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.params
            .get(name)
            .filter(|v| !v.is_empty())
            .map(|v| v == "true" || v == "1")
    }

    /// Normalized `page`, `page_size`, `sort_by` and `sort_dir`
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.parse("page"),
            self.parse("page_size"),
            self.string("sort_by"),
            self.params.get("sort_dir").map(String::as_str),
        )
    }
}

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(params)| params)
            .unwrap_or_default();
        Ok(Self::new(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactStatus, FileType};
    use crate::repository::SortDirection;
    use axum::http::Request;

    #[test]
    fn test_defaults_when_empty() {
        let query = ListQuery::default();
        assert_eq!(query.page_request(), PageRequest::default());
        assert_eq!(query.string("search"), None);
        assert_eq!(query.bool("is_active"), None);
    }

    #[test]
    fn test_unparseable_paging_is_ignored() {
        let query = ListQuery::from_pairs([("page", "abc"), ("page_size", "-5"), ("sort_dir", "up")]);
        let page = query.page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.sort_dir, SortDirection::Desc);
    }

    #[test]
    fn test_sort_parameters() {
        let query = ListQuery::from_pairs([("sort_by", "title"), ("sort_dir", "ASC")]);
        let page = query.page_request();
        assert_eq!(page.sort_by.as_deref(), Some("title"));
        assert_eq!(page.sort_dir, SortDirection::Asc);
    }

    #[test]
    fn test_bool_semantics() {
        assert_eq!(ListQuery::from_pairs([("f", "true")]).bool("f"), Some(true));
        assert_eq!(ListQuery::from_pairs([("f", "1")]).bool("f"), Some(true));
        assert_eq!(ListQuery::from_pairs([("f", "yes")]).bool("f"), Some(false));
        assert_eq!(ListQuery::from_pairs([("f", "")]).bool("f"), None);
    }

    #[test]
    fn test_coded_filters_accept_code_or_name() {
        let query = ListQuery::from_pairs([("status", "2"), ("file_type", "video"), ("x", "9")]);
        assert_eq!(query.parse::<ContactStatus>("status"), Some(ContactStatus::Read));
        assert_eq!(query.parse::<FileType>("file_type"), Some(FileType::Video));
        assert_eq!(query.parse::<FileType>("x"), None);
    }

    #[tokio::test]
    async fn test_extracts_from_uri() {
        let request = Request::builder()
            .uri("/api/v1/tags?search=ru%20st&page=3")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let query = ListQuery::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(query.string("search").as_deref(), Some("ru st"));
        assert_eq!(query.page_request().page, 3);
    }
}

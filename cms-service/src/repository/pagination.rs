//! Pagination, sorting and filter primitives shared by every list operation
//!
//! Raw paging input is never an error: out-of-range values clamp to defaults.
//!
//! ```rust
//! use cms_service::repository::{PageRequest, SortDirection};
//!
//! let request = PageRequest::new(Some(0), Some(500), Some("title".into()), Some("ASC"));
//! assert_eq!(request.page, 1);
//! assert_eq!(request.page_size, 100);
//! assert_eq!(request.sort_dir, SortDirection::Asc);
//! assert_eq!(request.offset(), 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

/// Page size used when none (or an invalid one) is supplied
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order
    Asc,
    /// Descending order
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a direction, falling back to descending for anything unrecognised
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Normalized paging and sorting parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number
    pub page: u32,
    /// Items per page, within `1..=MAX_PAGE_SIZE`
    pub page_size: u32,
    /// Requested sort column; validated against an allow-list at query time
    pub sort_by: Option<String>,
    /// Sort direction
    pub sort_dir: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_dir: SortDirection::Desc,
        }
    }
}

impl PageRequest {
    /// Build a request from raw values, clamping anything out of range
    ///
    /// `page < 1` becomes 1, `page_size < 1` becomes [`DEFAULT_PAGE_SIZE`] and
    /// `page_size > MAX_PAGE_SIZE` becomes [`MAX_PAGE_SIZE`].
    pub fn new(
        page: Option<i64>,
        page_size: Option<i64>,
        sort_by: Option<String>,
        sort_dir: Option<&str>,
    ) -> Self {
        let page = match page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };
        let page_size = match page_size {
            Some(size) if size < 1 => DEFAULT_PAGE_SIZE,
            Some(size) if size > i64::from(MAX_PAGE_SIZE) => MAX_PAGE_SIZE,
            Some(size) => size as u32,
            None => DEFAULT_PAGE_SIZE,
        };
        let sort_by = sort_by.filter(|s| !s.trim().is_empty());

        Self {
            page,
            page_size,
            sort_by,
            sort_dir: SortDirection::parse_lenient(sort_dir),
        }
    }

    /// Rows to skip
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    /// Rows to return
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Total number of pages for `total` rows at `page_size` rows per page
///
/// Rounds up, and reports a single (empty) page when there are no rows.
///
/// ```rust
/// use cms_service::repository::total_pages;
///
/// assert_eq!(total_pages(0, 20), 1);
/// assert_eq!(total_pages(20, 20), 1);
/// assert_eq!(total_pages(21, 20), 2);
/// ```
#[must_use]
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if total == 0 {
        return 1;
    }
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size);
    pages.min(u64::from(u32::MAX)) as u32
}

/// One page of results plus the count across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Matching rows across all pages
    pub total: u64,
    /// Page number these items belong to
    pub page: u32,
    /// Page size used for the query
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Assemble a page from query results
    pub fn new(items: Vec<T>, total: i64, request: &PageRequest) -> Self {
        Self {
            items,
            total: u64::try_from(total).unwrap_or(0),
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// Number of pages for this result set
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }

    /// Transform each item, keeping the paging data
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Allowed sort columns and the fallback ordering for one entity
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    /// Column names a caller may sort by
    pub columns: &'static [&'static str],
    /// Table alias prefix, e.g. `"cp."`, or empty
    pub prefix: &'static str,
    /// ORDER BY body used when no valid column is requested
    pub default_order: &'static str,
}

impl SortSpec {
    /// Resolve the ORDER BY body for a request
    ///
    /// Only allow-listed column names reach the SQL text.
    pub fn order_by(&self, request: &PageRequest) -> String {
        match request
            .sort_by
            .as_deref()
            .and_then(|requested| self.columns.iter().find(|c| **c == requested))
        {
            Some(column) => format!("{}{} {}", self.prefix, column, request.sort_dir.as_sql()),
            None => self.default_order.to_string(),
        }
    }

    /// Append `ORDER BY ... LIMIT ... OFFSET ...`
    pub fn push_page(&self, builder: &mut QueryBuilder<'_, Postgres>, request: &PageRequest) {
        builder.push(" ORDER BY ");
        builder.push(self.order_by(request));
        builder.push(" LIMIT ");
        builder.push_bind(request.limit());
        builder.push(" OFFSET ");
        builder.push_bind(request.offset());
    }
}

/// Accumulates AND-ed WHERE conditions on a query builder
///
/// The first condition opens the clause; absent filters push nothing.
pub struct WhereClause {
    started: bool,
}

impl WhereClause {
    /// Start with no conditions
    pub fn new() -> Self {
        Self { started: false }
    }

    /// Emit the joining keyword for the next condition
    pub fn next<'a, 'args>(
        &mut self,
        builder: &'a mut QueryBuilder<'args, Postgres>,
    ) -> &'a mut QueryBuilder<'args, Postgres> {
        if self.started {
            builder.push(" AND ");
        } else {
            builder.push(" WHERE ");
            self.started = true;
        }
        builder
    }
}

impl Default for WhereClause {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates comma-separated assignments for a partial `UPDATE`
///
/// Tracks whether anything was assigned so callers can skip the statement.
pub struct SetClause {
    assigned: usize,
}

impl SetClause {
    /// Start with no assignments
    pub fn new() -> Self {
        Self { assigned: 0 }
    }

    /// Emit the joining keyword for the next assignment
    pub fn next<'a, 'args>(
        &mut self,
        builder: &'a mut QueryBuilder<'args, Postgres>,
    ) -> &'a mut QueryBuilder<'args, Postgres> {
        builder.push(if self.assigned == 0 { " SET " } else { ", " });
        self.assigned += 1;
        builder
    }

    /// Whether no assignment was emitted
    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }
}

impl Default for SetClause {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a free-text term for a case-insensitive substring match
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG_SORT: SortSpec = SortSpec {
        columns: &["name", "slug", "created_at"],
        prefix: "",
        default_order: "name ASC",
    };

    #[test]
    fn test_defaults() {
        let request = PageRequest::new(None, None, None, None);
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.page_size, 20);
        assert_eq!(request.sort_dir, SortDirection::Desc);
    }

    #[test]
    fn test_page_below_one_clamps_to_first_page() {
        assert_eq!(PageRequest::new(Some(0), None, None, None).page, 1);
        assert_eq!(PageRequest::new(Some(-7), None, None, None).page, 1);
        assert_eq!(PageRequest::new(Some(3), None, None, None).page, 3);
    }

    #[test]
    fn test_page_size_clamps_into_range() {
        assert_eq!(PageRequest::new(None, Some(0), None, None).page_size, 20);
        assert_eq!(PageRequest::new(None, Some(-1), None, None).page_size, 20);
        assert_eq!(PageRequest::new(None, Some(101), None, None).page_size, 100);
        assert_eq!(PageRequest::new(None, Some(100), None, None).page_size, 100);
        assert_eq!(PageRequest::new(None, Some(1), None, None).page_size, 1);
    }

    #[test]
    fn test_sort_direction_is_lenient() {
        assert_eq!(SortDirection::parse_lenient(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::parse_lenient(Some("sideways")), SortDirection::Desc);
        assert_eq!(SortDirection::parse_lenient(None), SortDirection::Desc);
    }

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(Some(3), Some(25), None, None);
        assert_eq!(request.offset(), 50);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_page_map_keeps_counts() {
        let request = PageRequest::new(Some(2), Some(2), None, None);
        let page = Page::new(vec![1, 2], 5, &request).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_order_by_uses_allow_list() {
        let request = PageRequest::new(None, None, Some("slug".into()), Some("asc"));
        assert_eq!(TAG_SORT.order_by(&request), "slug ASC");

        let injected = PageRequest::new(None, None, Some("name; DROP TABLE tags".into()), None);
        assert_eq!(TAG_SORT.order_by(&injected), "name ASC");

        assert_eq!(TAG_SORT.order_by(&PageRequest::default()), "name ASC");
    }

    #[test]
    fn test_order_by_applies_prefix() {
        let spec = SortSpec {
            columns: &["title"],
            prefix: "cp.",
            default_order: "cp.created_at DESC",
        };
        let request = PageRequest::new(None, None, Some("title".into()), None);
        assert_eq!(spec.order_by(&request), "cp.title DESC");
    }

    #[test]
    fn test_where_clause_joins_conditions() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM tags");
        let mut clause = WhereClause::new();
        clause.next(&mut builder).push("a = ").push_bind(1_i32);
        clause.next(&mut builder).push("b = ").push_bind(2_i32);
        TAG_SORT.push_page(&mut builder, &PageRequest::default());
        assert_eq!(
            builder.sql(),
            "SELECT * FROM tags WHERE a = $1 AND b = $2 ORDER BY name ASC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn test_where_clause_without_conditions_adds_nothing() {
        let builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tags");
        let _clause = WhereClause::new();
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM tags");
    }

    #[test]
    fn test_set_clause_separates_assignments() {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE tags");
        let mut set = SetClause::new();
        assert!(set.is_empty());
        set.next(&mut builder).push("name = ").push_bind("News");
        set.next(&mut builder).push("slug = ").push_bind("news");
        builder.push(" WHERE id = ").push_bind(7_i32);
        assert!(!set.is_empty());
        assert_eq!(
            builder.sql(),
            "UPDATE tags SET name = $1, slug = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("rust"), "%rust%");
    }
}

//! Data access for every CMS entity
//!
//! This module provides one Postgres repository per entity behind a shared
//! [`Repository`] trait, plus the paging and error types they have in common.
//!
//! # Features
//!
//! - **Generic CRUD**: [`Repository`] for find, list, create, update and delete
//! - **Error taxonomy**: [`RepositoryErrorKind`] classifies every storage failure
//! - **Pagination**: [`PageRequest`] normalizes paging input, [`Page`] carries results
//! - **Dynamic SQL**: [`WhereClause`], [`SetClause`] and [`SortSpec`] build
//!   filtered, partial and allow-list-sorted statements with bound parameters
//!
//! # Example
//!
//! ```rust,ignore
//! use cms_service::models::TagFilter;
//! use cms_service::repository::{PageRequest, Repository, TagRepository};
//!
//! let tags = TagRepository::new(pool);
//! let page = tags
//!     .list(&TagFilter { search: Some("rust".into()) }, &PageRequest::default())
//!     .await?;
//! println!("{} of {} tags", page.items.len(), page.total);
//! ```

mod contact;
mod content_type;
mod error;
mod media;
mod pagination;
mod post;
mod setting;
mod tag;
mod traits;

// Re-export all public types
pub use contact::ContactRepository;
pub use content_type::ContentTypeRepository;
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use media::MediaRepository;
pub use pagination::{
    like_pattern, total_pages, Page, PageRequest, SetClause, SortDirection, SortSpec,
    WhereClause, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use post::PostRepository;
pub use setting::SettingRepository;
pub use tag::TagRepository;
pub use traits::{Repository, RepositoryResult};

//! HTTP handlers for the CMS REST surface
//!
//! Each entity has its own module of plain axum handler functions over
//! [`AppState`](crate::state::AppState). They share the pieces defined here:
//!
//! - **Errors**: [`ApiError`] with automatic HTTP status code mapping, and
//!   [`EntityMessages`] for translating repository errors per entity
//! - **Envelope**: [`ApiResponse`] wraps every body as
//!   `{"success", "data", "error", "meta"}`; [`ItemResponse`], [`Created`],
//!   [`ListResponse`] and [`NoContent`] pick the status code
//! - **Input**: [`ListQuery`] for lenient list parameters, [`JsonBody`] and
//!   [`parse_uuid`] for bodies and path ids, [`ClientInfo`] for caller metadata
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::extract::{Path, State};
//! use cms_service::handlers::{parse_uuid, ApiError, ItemResponse};
//!
//! async fn get_tag(
//!     State(state): State<AppState>,
//!     Path(id): Path<String>,
//! ) -> Result<ItemResponse<Tag>, ApiError> {
//!     let id = parse_uuid(&id, "tag")?;
//!     let tag = state.tags().find_by_id(&id).await.map_err(|e| TAGS.error(e))?;
//!     Ok(ItemResponse(tag))
//! }
//! ```

mod error;
mod extract;
mod query;
mod response;

pub mod contacts;
pub mod content_types;
pub mod media;
pub mod posts;
pub mod settings;
pub mod tags;

// Re-export all public types
pub use error::{ApiError, ApiErrorKind, ApiOperation, EntityMessages};
pub use extract::{parse_uuid, ClientInfo, JsonBody};
pub use query::ListQuery;
pub use response::{
    ApiResponse, Created, ErrorBody, ItemResponse, ListResponse, NoContent, PaginationMeta,
};

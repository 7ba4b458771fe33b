//! `/api/v1/tags` handlers

use axum::extract::{Path, State};

use super::error::{ApiError, ApiOperation, EntityMessages};
use super::extract::{parse_uuid, JsonBody};
use super::query::ListQuery;
use super::response::{Created, ItemResponse, ListResponse, NoContent};
use crate::models::{CreateTag, Tag, TagFilter, UpdateTag};
use crate::repository::Repository;
use crate::state::AppState;

pub(crate) const TAGS: EntityMessages = EntityMessages {
    not_found: "Tag not found",
    duplicate: "Tag with this name or slug already exists",
    invalid_reference: "Invalid tag reference",
    in_use: "Tag is still in use",
};

pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<ListResponse<Tag>, ApiError> {
    let filter = TagFilter {
        search: query.string("search"),
    };
    let page = state
        .tags()
        .list(&filter, &query.page_request())
        .await
        .map_err(|e| TAGS.error(e))?;
    Ok(ListResponse(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ItemResponse<Tag>, ApiError> {
    let id = parse_uuid(&id, "tag")?;
    let tag = state.tags().find_by_id(&id).await.map_err(|e| TAGS.error(e))?;
    Ok(ItemResponse(tag))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ItemResponse<Tag>, ApiError> {
    let tag = state.tags().find_by_slug(&slug).await.map_err(|e| TAGS.error(e))?;
    Ok(ItemResponse(tag))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTag>,
) -> Result<Created<Tag>, ApiError> {
    body.validate()?;
    let tag = state.tags().create(body).await.map_err(|e| TAGS.error(e))?;
    Ok(Created(tag))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateTag>,
) -> Result<ItemResponse<Tag>, ApiError> {
    let id = parse_uuid(&id, "tag")?;
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    let tag = state.tags().update(&id, body).await.map_err(|e| TAGS.error(e))?;
    Ok(ItemResponse(tag))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_uuid(&id, "tag")?;
    state.tags().delete(&id).await.map_err(|e| TAGS.error(e))?;
    Ok(NoContent)
}

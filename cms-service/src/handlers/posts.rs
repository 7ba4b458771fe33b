//! `/api/v1/posts` handlers, including media attachments

use axum::extract::{Path, State};

use super::error::{ApiError, ApiOperation, EntityMessages};
use super::extract::{parse_uuid, JsonBody};
use super::query::ListQuery;
use super::response::{Created, ItemResponse, ListResponse, NoContent};
use crate::models::{AttachMedia, CreatePost, PostDetail, PostFilter, PostMedia, PostSummary, UpdatePost};
use crate::repository::Repository;
use crate::state::AppState;

pub(crate) const POSTS: EntityMessages = EntityMessages {
    not_found: "Post not found",
    duplicate: "Post with this slug already exists",
    invalid_reference: "Invalid content type, author or tag ID",
    in_use: "Cannot delete post that is still referenced",
};

pub(crate) const ATTACHMENTS: EntityMessages = EntityMessages {
    not_found: "Media attachment not found",
    duplicate: "Media already attached to this post",
    invalid_reference: "Invalid post ID or media ID",
    in_use: "Media attachment is still referenced",
};

fn filter(query: &ListQuery) -> PostFilter {
    PostFilter {
        content_type_id: query.uuid("content_type_id"),
        author_id: query.uuid("author_id"),
        status: query.parse("status"),
        search: query.string("search"),
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<ListResponse<PostSummary>, ApiError> {
    let page = state
        .posts()
        .list(&filter(&query), &query.page_request())
        .await
        .map_err(|e| POSTS.error(e))?;
    Ok(ListResponse(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ItemResponse<PostDetail>, ApiError> {
    let id = parse_uuid(&id, "post")?;
    let post = state.posts().find_by_id(&id).await.map_err(|e| POSTS.error(e))?;
    Ok(ItemResponse(post))
}

/// Public read by slug; bumps the view counter without delaying the response
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ItemResponse<PostDetail>, ApiError> {
    let post = state
        .posts()
        .find_by_slug(&slug)
        .await
        .map_err(|e| POSTS.error(e))?;

    let posts = state.posts().clone();
    let id = post.post.id;
    tokio::spawn(async move {
        if let Err(e) = posts.increment_view_count(id).await {
            tracing::warn!(post_id = %id, error = %e, "Failed to increment view count");
        }
    });

    Ok(ItemResponse(post))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreatePost>,
) -> Result<Created<PostDetail>, ApiError> {
    body.validate()?;
    let post = state.posts().create(body).await.map_err(|e| POSTS.error(e))?;
    tracing::info!(post_id = %post.post.id, slug = %post.post.slug, "Post created");
    Ok(Created(post))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdatePost>,
) -> Result<ItemResponse<PostDetail>, ApiError> {
    let id = parse_uuid(&id, "post")?;
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    let post = state.posts().update(&id, body).await.map_err(|e| POSTS.error(e))?;
    Ok(ItemResponse(post))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_uuid(&id, "post")?;
    state.posts().delete(&id).await.map_err(|e| POSTS.error(e))?;
    tracing::info!(post_id = %id, "Post deleted");
    Ok(NoContent)
}

pub async fn attach_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AttachMedia>,
) -> Result<Created<PostMedia>, ApiError> {
    let post_id = parse_uuid(&id, "post")?;
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::AttachMedia))?;
    let attachment = state
        .posts()
        .attach_media(post_id, body)
        .await
        .map_err(|e| ATTACHMENTS.error(e))?;
    Ok(Created(attachment))
}

pub async fn detach_media(
    State(state): State<AppState>,
    Path((id, media_id)): Path<(String, String)>,
) -> Result<NoContent, ApiError> {
    let post_id = parse_uuid(&id, "post")?;
    let media_id = parse_uuid(&media_id, "media")?;
    state
        .posts()
        .detach_media(post_id, media_id)
        .await
        .map_err(|e| ATTACHMENTS.error(e))?;
    Ok(NoContent)
}

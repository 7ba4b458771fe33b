//! `/api/v1/media` handlers
//!
//! Only metadata is stored here; the bytes live in object storage under
//! `bucket_name`/`object_key`.

use axum::extract::{Path, State};

use super::error::{ApiError, ApiOperation, EntityMessages};
use super::extract::{parse_uuid, JsonBody};
use super::query::ListQuery;
use super::response::{Created, ItemResponse, ListResponse, NoContent};
use crate::models::{CreateMedia, Media, MediaFilter, UpdateMedia};
use crate::repository::Repository;
use crate::state::AppState;

pub(crate) const MEDIA: EntityMessages = EntityMessages {
    not_found: "Media not found",
    duplicate: "Media with this object key already exists",
    invalid_reference: "Invalid media reference",
    in_use: "Cannot delete media that is attached to posts",
};

fn filter(query: &ListQuery) -> MediaFilter {
    MediaFilter {
        file_type: query.parse("file_type"),
        search: query.string("search"),
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<ListResponse<Media>, ApiError> {
    let page = state
        .media()
        .list(&filter(&query), &query.page_request())
        .await
        .map_err(|e| MEDIA.error(e))?;
    Ok(ListResponse(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ItemResponse<Media>, ApiError> {
    let id = parse_uuid(&id, "media")?;
    let media = state.media().find_by_id(&id).await.map_err(|e| MEDIA.error(e))?;
    Ok(ItemResponse(media))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateMedia>,
) -> Result<Created<Media>, ApiError> {
    body.validate()?;
    let media = state.media().create(body).await.map_err(|e| MEDIA.error(e))?;
    tracing::info!(media_id = %media.id, object_key = %media.object_key, "Media registered");
    Ok(Created(media))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateMedia>,
) -> Result<ItemResponse<Media>, ApiError> {
    let id = parse_uuid(&id, "media")?;
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    let media = state.media().update(&id, body).await.map_err(|e| MEDIA.error(e))?;
    Ok(ItemResponse(media))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_uuid(&id, "media")?;
    state.media().delete(&id).await.map_err(|e| MEDIA.error(e))?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use crate::models::FileType;
    use crate::repository::{RepositoryError, RepositoryOperation};

    #[test]
    fn test_file_type_filter_accepts_code_or_name() {
        let query = ListQuery::from_pairs([("file_type", "2")]);
        assert_eq!(filter(&query).file_type, Some(FileType::Video));

        let query = ListQuery::from_pairs([("file_type", "image")]);
        assert_eq!(filter(&query).file_type, Some(FileType::Image));

        let query = ListQuery::from_pairs([("file_type", "9")]);
        assert_eq!(filter(&query).file_type, None);
    }

    #[test]
    fn test_delete_attached_media_is_conflict() {
        let error = MEDIA.error(RepositoryError::foreign_key_violation(
            RepositoryOperation::Delete,
            "Media",
        ));
        assert_eq!(error.kind, ApiErrorKind::Conflict);
        assert_eq!(error.message, "Cannot delete media that is attached to posts");
    }
}

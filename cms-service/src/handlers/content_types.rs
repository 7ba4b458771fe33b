//! `/api/v1/content-types` handlers

use axum::extract::{Path, State};

use super::error::{ApiError, ApiOperation, EntityMessages};
use super::extract::{parse_uuid, JsonBody};
use super::query::ListQuery;
use super::response::{Created, ItemResponse, ListResponse, NoContent};
use crate::models::{ContentType, ContentTypeFilter, CreateContentType, UpdateContentType};
use crate::repository::Repository;
use crate::state::AppState;

pub(crate) const CONTENT_TYPES: EntityMessages = EntityMessages {
    not_found: "Content type not found",
    duplicate: "Content type with this name or slug already exists",
    invalid_reference: "Invalid content type reference",
    in_use: "Cannot delete content type with existing posts",
};

pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<ListResponse<ContentType>, ApiError> {
    let filter = ContentTypeFilter {
        is_active: query.bool("is_active"),
    };
    let page = state
        .content_types()
        .list(&filter, &query.page_request())
        .await
        .map_err(|e| CONTENT_TYPES.error(e))?;
    Ok(ListResponse(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ItemResponse<ContentType>, ApiError> {
    let id = parse_uuid(&id, "content type")?;
    let content_type = state
        .content_types()
        .find_by_id(&id)
        .await
        .map_err(|e| CONTENT_TYPES.error(e))?;
    Ok(ItemResponse(content_type))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ItemResponse<ContentType>, ApiError> {
    let content_type = state
        .content_types()
        .find_by_slug(&slug)
        .await
        .map_err(|e| CONTENT_TYPES.error(e))?;
    Ok(ItemResponse(content_type))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateContentType>,
) -> Result<Created<ContentType>, ApiError> {
    body.validate()?;
    let content_type = state
        .content_types()
        .create(body)
        .await
        .map_err(|e| CONTENT_TYPES.error(e))?;
    tracing::info!(content_type_id = %content_type.id, slug = %content_type.slug, "Content type created");
    Ok(Created(content_type))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateContentType>,
) -> Result<ItemResponse<ContentType>, ApiError> {
    let id = parse_uuid(&id, "content type")?;
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    let content_type = state
        .content_types()
        .update(&id, body)
        .await
        .map_err(|e| CONTENT_TYPES.error(e))?;
    Ok(ItemResponse(content_type))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_uuid(&id, "content type")?;
    state
        .content_types()
        .delete(&id)
        .await
        .map_err(|e| CONTENT_TYPES.error(e))?;
    tracing::info!(content_type_id = %id, "Content type deleted");
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use crate::repository::{RepositoryError, RepositoryOperation};

    #[test]
    fn test_delete_with_posts_is_conflict() {
        let error = CONTENT_TYPES.error(RepositoryError::foreign_key_violation(
            RepositoryOperation::Delete,
            "ContentType",
        ));
        assert_eq!(error.kind, ApiErrorKind::Conflict);
        assert_eq!(error.message, "Cannot delete content type with existing posts");
    }

    #[test]
    fn test_invalid_id_names_the_entity() {
        let error = parse_uuid("abc", "content type").unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::BadRequest);
        assert_eq!(error.message, "Invalid content type ID");
    }
}

//! `/api/v1/settings` handlers; settings are addressed by key

use std::collections::HashMap;

use axum::extract::{Path, State};

use super::error::{ApiError, ApiOperation, EntityMessages};
use super::extract::JsonBody;
use super::query::ListQuery;
use super::response::{Created, ItemResponse, ListResponse, NoContent};
use crate::models::{CreateSetting, Setting, SettingFilter, UpdateSetting};
use crate::repository::Repository;
use crate::state::AppState;

pub(crate) const SETTINGS: EntityMessages = EntityMessages {
    not_found: "Setting not found",
    duplicate: "Setting with this key already exists",
    invalid_reference: "Invalid setting reference",
    in_use: "Setting is still referenced",
};

pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<ListResponse<Setting>, ApiError> {
    let filter = SettingFilter {
        search: query.string("search"),
    };
    let page = state
        .settings()
        .list(&filter, &query.page_request())
        .await
        .map_err(|e| SETTINGS.error(e))?;
    Ok(ListResponse(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ItemResponse<Setting>, ApiError> {
    let setting = state
        .settings()
        .find_by_id(&key)
        .await
        .map_err(|e| SETTINGS.error(e))?;
    Ok(ItemResponse(setting))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateSetting>,
) -> Result<Created<Setting>, ApiError> {
    body.validate()?;
    let setting = state.settings().create(body).await.map_err(|e| SETTINGS.error(e))?;
    Ok(Created(setting))
}

/// Create the key, or replace its value and description
pub async fn upsert(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateSetting>,
) -> Result<ItemResponse<Setting>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Upsert))?;
    let setting = state.settings().upsert(body).await.map_err(|e| SETTINGS.error(e))?;
    Ok(ItemResponse(setting))
}

/// Values for several keys; keys without a stored value are omitted
pub async fn bulk_get(
    State(state): State<AppState>,
    JsonBody(keys): JsonBody<Vec<String>>,
) -> Result<ItemResponse<HashMap<String, String>>, ApiError> {
    let keys = requested_keys(keys)?;
    let values = state
        .settings()
        .get_multiple(&keys)
        .await
        .map_err(|e| SETTINGS.error(e))?;
    Ok(ItemResponse(values))
}

pub async fn update(
    State(state): State<AppState>,
    Path(key): Path<String>,
    JsonBody(body): JsonBody<UpdateSetting>,
) -> Result<ItemResponse<Setting>, ApiError> {
    let setting = state
        .settings()
        .update(&key, body)
        .await
        .map_err(|e| SETTINGS.error(e))?;
    Ok(ItemResponse(setting))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<NoContent, ApiError> {
    state.settings().delete(&key).await.map_err(|e| SETTINGS.error(e))?;
    Ok(NoContent)
}

fn requested_keys(keys: Vec<String>) -> Result<Vec<String>, ApiError> {
    if keys.is_empty() {
        return Err(ApiError::bad_request("At least one key is required")
            .with_operation(ApiOperation::BulkGet));
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use crate::repository::{RepositoryError, RepositoryOperation};

    #[test]
    fn test_empty_bulk_request_is_rejected() {
        let error = requested_keys(Vec::new()).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::BadRequest);
        assert_eq!(error.message, "At least one key is required");

        let keys = requested_keys(vec!["site_name".into()]).unwrap();
        assert_eq!(keys, vec!["site_name".to_string()]);
    }

    #[test]
    fn test_duplicate_key_is_conflict() {
        let error = SETTINGS.error(RepositoryError::duplicate(
            RepositoryOperation::Create,
            "Setting",
        ));
        assert_eq!(error.kind, ApiErrorKind::Conflict);
        assert_eq!(error.message, "Setting with this key already exists");
    }
}

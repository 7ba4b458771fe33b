//! `/api/v1/contacts` handlers

use axum::extract::{Path, State};
use serde::Serialize;

use super::error::{ApiError, ApiOperation, EntityMessages};
use super::extract::{parse_uuid, ClientInfo, JsonBody};
use super::query::ListQuery;
use super::response::{Created, ItemResponse, ListResponse, NoContent};
use crate::models::{ContactFilter, ContactSubmission, CreateContact, NewContact, UpdateContact};
use crate::repository::Repository;
use crate::state::AppState;

pub(crate) const CONTACTS: EntityMessages = EntityMessages {
    not_found: "Contact submission not found",
    duplicate: "Contact submission already exists",
    invalid_reference: "Invalid contact reference",
    in_use: "Contact submission is still referenced",
};

/// Body of `GET /contacts/unread-count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

fn filter(query: &ListQuery) -> ContactFilter {
    ContactFilter {
        status: query.parse("status"),
        email: query.string("email"),
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<ListResponse<ContactSubmission>, ApiError> {
    let page = state
        .contacts()
        .list(&filter(&query), &query.page_request())
        .await
        .map_err(|e| CONTACTS.error(e))?;
    Ok(ListResponse(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ItemResponse<ContactSubmission>, ApiError> {
    let id = parse_uuid(&id, "contact")?;
    let contact = state
        .contacts()
        .find_by_id(&id)
        .await
        .map_err(|e| CONTACTS.error(e))?;
    Ok(ItemResponse(contact))
}

/// Public form submission; the caller's address and agent are recorded
pub async fn create(
    State(state): State<AppState>,
    client: ClientInfo,
    JsonBody(body): JsonBody<CreateContact>,
) -> Result<Created<ContactSubmission>, ApiError> {
    body.validate()?;
    let contact = state
        .contacts()
        .create(NewContact {
            submission: body,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })
        .await
        .map_err(|e| CONTACTS.error(e))?;
    tracing::info!(contact_id = %contact.id, "Contact submission received");
    Ok(Created(contact))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateContact>,
) -> Result<ItemResponse<ContactSubmission>, ApiError> {
    let id = parse_uuid(&id, "contact")?;
    body.validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    let contact = state
        .contacts()
        .update(&id, body)
        .await
        .map_err(|e| CONTACTS.error(e))?;
    Ok(ItemResponse(contact))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError> {
    let id = parse_uuid(&id, "contact")?;
    state.contacts().delete(&id).await.map_err(|e| CONTACTS.error(e))?;
    Ok(NoContent)
}

pub async fn unread_count(
    State(state): State<AppState>,
) -> Result<ItemResponse<UnreadCount>, ApiError> {
    let unread_count = state
        .contacts()
        .count_unread()
        .await
        .map_err(|e| CONTACTS.error(e))?;
    Ok(ItemResponse(UnreadCount { unread_count }))
}

//! API error types for handler operations
//!
//! [`ApiError`] carries an HTTP-level category plus the context needed for
//! logging, and renders as the standard `{"success": false, "error": ...}`
//! envelope via `IntoResponse`.
//!
//! # Example
//!
//! ```rust
//! use cms_service::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("Post not found");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.kind.error_code(), "NOT_FOUND");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::response::{ApiResponse, ErrorBody};
use crate::models::ValidationErrors;
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing entities
    List,
    /// Getting a single entity by ID, slug or key
    Get,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
    /// Insert-or-replace by natural key
    Upsert,
    /// Reading several settings at once
    BulkGet,
    /// Attaching media to a post
    AttachMedia,
    /// Detaching media from a post
    DetachMedia,
    /// Routing (unknown path or method)
    Route,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Upsert => write!(f, "upsert"),
            Self::BulkGet => write!(f, "bulk_get"),
            Self::AttachMedia => write!(f, "attach_media"),
            Self::DetachMedia => write!(f, "detach_media"),
            Self::Route => write!(f, "route"),
        }
    }
}

impl From<RepositoryOperation> for ApiOperation {
    fn from(op: RepositoryOperation) -> Self {
        match op {
            RepositoryOperation::FindById | RepositoryOperation::FindBySlug => Self::Get,
            RepositoryOperation::List | RepositoryOperation::Count => Self::List,
            RepositoryOperation::Create => Self::Create,
            RepositoryOperation::Update | RepositoryOperation::IncrementViewCount => Self::Update,
            RepositoryOperation::Delete => Self::Delete,
            RepositoryOperation::Upsert => Self::Upsert,
            RepositoryOperation::BulkGet => Self::BulkGet,
            RepositoryOperation::AttachMedia => Self::AttachMedia,
            RepositoryOperation::DetachMedia => Self::DetachMedia,
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Entity or endpoint was not found
    NotFound,
    /// Operation conflicts with stored state
    Conflict,
    /// Malformed body, path or parameter
    BadRequest,
    /// Body parsed but failed field validation
    ValidationFailed,
    /// Path exists but not for this method
    MethodNotAllowed,
    /// Handler did not finish within the request timeout
    RequestTimeout,
    /// Request body exceeded the configured limit
    PayloadTooLarge,
    /// Anything the client cannot fix
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::MethodNotAllowed => write!(f, "method_not_allowed"),
            Self::RequestTimeout => write!(f, "request_timeout"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the error envelope
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::BadRequest => "BAD_REQUEST",
            Self::ValidationFailed => "VALIDATION_ERROR",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::RequestTimeout => "REQUEST_TIMEOUT",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Client-facing messages for one entity's repository failures
///
/// ```rust
/// use cms_service::handlers::{ApiErrorKind, EntityMessages};
/// use cms_service::repository::{RepositoryError, RepositoryOperation};
///
/// const TAGS: EntityMessages = EntityMessages {
///     not_found: "Tag not found",
///     duplicate: "Tag with this name or slug already exists",
///     invalid_reference: "Invalid tag reference",
///     in_use: "Tag is in use",
/// };
///
/// let error = TAGS.error(RepositoryError::duplicate(RepositoryOperation::Create, "Tag"));
/// assert_eq!(error.kind, ApiErrorKind::Conflict);
/// assert_eq!(error.message, "Tag with this name or slug already exists");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EntityMessages {
    /// `NotFound`
    pub not_found: &'static str,
    /// `Duplicate`
    pub duplicate: &'static str,
    /// `ForeignKeyViolation` on a write: the body names something that does not exist
    pub invalid_reference: &'static str,
    /// `ForeignKeyViolation` on delete: other rows still reference this one
    pub in_use: &'static str,
}

impl EntityMessages {
    /// Translate a repository error into its HTTP form
    pub fn error(&self, err: RepositoryError) -> ApiError {
        let operation = ApiOperation::from(err.operation);
        let (kind, message) = match err.kind {
            RepositoryErrorKind::NotFound => (ApiErrorKind::NotFound, self.not_found.to_string()),
            RepositoryErrorKind::Duplicate => (ApiErrorKind::Conflict, self.duplicate.to_string()),
            RepositoryErrorKind::ForeignKeyViolation
                if err.operation == RepositoryOperation::Delete =>
            {
                (ApiErrorKind::Conflict, self.in_use.to_string())
            }
            RepositoryErrorKind::ForeignKeyViolation => (
                ApiErrorKind::BadRequest,
                self.invalid_reference.to_string(),
            ),
            RepositoryErrorKind::StorageFailure => {
                return ApiError::internal(err.to_string()).with_operation(operation);
            }
        };

        ApiError {
            operation,
            kind,
            message,
            details: None,
            internal: Some(err.to_string()),
        }
    }
}

/// Structured API error with operation context
///
/// `internal` holds diagnostic text for logs and never reaches the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Client-facing message
    pub message: String,
    /// Per-field validation messages
    pub details: Option<BTreeMap<String, String>>,
    /// Log-only detail
    pub internal: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            details: None,
            internal: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::BadRequest, message)
    }

    pub fn conflict(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::Conflict, message)
    }

    /// 422 with one message per failing field
    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            details: Some(errors.into()),
            ..Self::new(
                ApiOperation::Create,
                ApiErrorKind::ValidationFailed,
                "Validation failed",
            )
        }
    }

    /// 500 with a fixed client message; `detail` is logged only
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            internal: Some(detail.into()),
            ..Self::new(
                ApiOperation::Get,
                ApiErrorKind::InternalError,
                "An internal error occurred",
            )
        }
    }

    pub fn endpoint_not_found() -> Self {
        Self::new(ApiOperation::Route, ApiErrorKind::NotFound, "Endpoint not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            ApiOperation::Route,
            ApiErrorKind::MethodNotAllowed,
            "Method not allowed",
        )
    }

    pub fn request_timeout() -> Self {
        Self::new(ApiOperation::Route, ApiErrorKind::RequestTimeout, "Request timed out")
    }

    pub fn payload_too_large() -> Self {
        Self::new(
            ApiOperation::Route,
            ApiErrorKind::PayloadTooLarge,
            "Request body too large",
        )
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Whether the failure is on the server side
    pub fn is_server_error(&self) -> bool {
        self.kind.status_code().is_server_error()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(internal) = &self.internal {
            write!(f, " ({})", internal)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if self.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                internal = ?self.internal,
                "API error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                internal = ?self.internal,
                "API error: {}", self.message
            );
        }

        let body = ApiResponse::<()>::failure(ErrorBody {
            code: self.kind.error_code().to_string(),
            message: self.message,
            details: self.details,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    const POSTS: EntityMessages = EntityMessages {
        not_found: "Post not found",
        duplicate: "Post with this slug already exists",
        invalid_reference: "Invalid content type, author or tag ID",
        in_use: "Post is still referenced",
    };

    async fn body_json(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiErrorKind::ValidationFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiErrorKind::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiErrorKind::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiErrorKind::ValidationFailed.error_code(), "VALIDATION_ERROR");
        assert_eq!(ApiErrorKind::InternalError.error_code(), "INTERNAL_ERROR");
        assert_eq!(ApiErrorKind::MethodNotAllowed.error_code(), "METHOD_NOT_ALLOWED");
        assert_eq!(ApiErrorKind::RequestTimeout.error_code(), "REQUEST_TIMEOUT");
        assert_eq!(ApiErrorKind::PayloadTooLarge.error_code(), "PAYLOAD_TOO_LARGE");
    }

    #[test]
    fn test_repository_mapping_for_writes() {
        let not_found = POSTS.error(RepositoryError::not_found("Post", "1"));
        assert_eq!(not_found.kind, ApiErrorKind::NotFound);
        assert_eq!(not_found.message, "Post not found");

        let duplicate = POSTS.error(RepositoryError::duplicate(RepositoryOperation::Update, "Post"));
        assert_eq!(duplicate.kind, ApiErrorKind::Conflict);
        assert_eq!(duplicate.operation, ApiOperation::Update);

        let dangling = POSTS.error(RepositoryError::foreign_key_violation(
            RepositoryOperation::Create,
            "Post",
        ));
        assert_eq!(dangling.kind, ApiErrorKind::BadRequest);
        assert_eq!(dangling.message, "Invalid content type, author or tag ID");
    }

    #[test]
    fn test_foreign_key_on_delete_is_conflict() {
        let error = POSTS.error(RepositoryError::foreign_key_violation(
            RepositoryOperation::Delete,
            "Post",
        ));
        assert_eq!(error.kind, ApiErrorKind::Conflict);
        assert_eq!(error.message, "Post is still referenced");
    }

    #[test]
    fn test_storage_failure_hides_detail() {
        let error = POSTS.error(RepositoryError::storage_failure(
            RepositoryOperation::List,
            "connection reset by peer",
        ));
        assert_eq!(error.kind, ApiErrorKind::InternalError);
        assert_eq!(error.message, "An internal error occurred");
        assert!(error.internal.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_envelope_for_not_found() {
        let (status, json) = body_json(ApiError::not_found("Tag not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Tag not found");
        assert!(json.get("data").is_none());
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_envelope_for_validation() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");
        let (status, json) = body_json(ApiError::validation(errors)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Validation failed");
        assert_eq!(json["error"]["details"]["title"], "Title is required");
    }

    #[tokio::test]
    async fn test_internal_body_never_contains_detail() {
        let (status, json) = body_json(ApiError::internal("pool timed out")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "An internal error occurred");
        assert!(!json.to_string().contains("pool timed out"));
    }

    #[test]
    fn test_display_includes_internal_detail() {
        let error = ApiError::internal("pool timed out").with_operation(ApiOperation::List);
        let display = error.to_string();
        assert!(display.contains("internal_error"));
        assert!(display.contains("list"));
        assert!(display.contains("pool timed out"));
    }
}

//! Route table
//!
//! `/health` sits at the root; every entity lives under `/api/v1`. Unknown
//! paths and unsupported methods answer in the standard error envelope.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{contacts, content_types, media, posts, settings, tags, ApiError};
use crate::health::health;
use crate::state::AppState;

/// Build the application router over `state`
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .fallback(endpoint_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/content-types",
            get(content_types::list).post(content_types::create),
        )
        .route("/content-types/slug/{slug}", get(content_types::get_by_slug))
        .route(
            "/content-types/{id}",
            get(content_types::get)
                .put(content_types::update)
                .delete(content_types::delete),
        )
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/slug/{slug}", get(posts::get_by_slug))
        .route(
            "/posts/{id}",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route("/posts/{id}/media", post(posts::attach_media))
        .route(
            "/posts/{id}/media/{media_id}",
            axum::routing::delete(posts::detach_media),
        )
        .route("/media", get(media::list).post(media::create))
        .route(
            "/media/{id}",
            get(media::get).put(media::update).delete(media::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route("/tags/slug/{slug}", get(tags::get_by_slug))
        .route(
            "/tags/{id}",
            get(tags::get).put(tags::update).delete(tags::delete),
        )
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route("/contacts/unread-count", get(contacts::unread_count))
        .route(
            "/contacts/{id}",
            get(contacts::get)
                .put(contacts::update)
                .delete(contacts::delete),
        )
        .route("/settings", get(settings::list).post(settings::create))
        .route("/settings/upsert", post(settings::upsert))
        .route("/settings/bulk", post(settings::bulk_get))
        .route(
            "/settings/{key}",
            get(settings::get)
                .put(settings::update)
                .delete(settings::delete),
        )
        .method_not_allowed_fallback(method_not_allowed)
}

async fn endpoint_not_found() -> ApiError {
    ApiError::endpoint_not_found()
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::connect_lazy;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config::default();
        let pool = connect_lazy(&config.database).unwrap();
        build(AppState::new(config, pool))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(empty_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["status"], json!("healthy"));
        assert_eq!(body["data"]["service"], json!("cms-service"));
        assert_eq!(body["data"]["version"], json!(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_envelope() {
        let (status, body) = send(empty_request(Method::GET, "/api/v1/widgets")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
        assert_eq!(body["error"]["message"], json!("Endpoint not found"));
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_wrong_method_is_method_not_allowed() {
        let (status, body) = send(empty_request(Method::PATCH, "/api/v1/tags")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"]["code"], json!("METHOD_NOT_ALLOWED"));
        assert_eq!(body["error"]["message"], json!("Method not allowed"));

        let (status, _) = send(empty_request(Method::POST, "/health")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_invalid_path_id_is_bad_request() {
        let (status, body) = send(empty_request(Method::GET, "/api/v1/posts/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
        assert_eq!(body["error"]["message"], json!("Invalid post ID"));

        let (status, body) =
            send(empty_request(Method::DELETE, "/api/v1/content-types/42")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], json!("Invalid content type ID"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = send(json_request(Method::POST, "/api/v1/tags", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], json!("Invalid request body"));

        let missing_content_type = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/tags")
            .body(Body::from(r#"{"name":"Rust","slug":"rust"}"#))
            .unwrap();
        let (status, _) = send(missing_content_type).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_fields_are_validation_errors() {
        let (status, body) =
            send(json_request(Method::POST, "/api/v1/posts", r#"{"title":"  "}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
        assert_eq!(body["error"]["message"], json!("Validation failed"));

        let details = &body["error"]["details"];
        assert_eq!(details["title"], json!("Title is required"));
        assert_eq!(details["slug"], json!("Slug is required"));
        assert_eq!(details["content_type_id"], json!("Content type ID is required"));
        assert_eq!(details["author_id"], json!("Author ID is required"));
    }

    #[tokio::test]
    async fn test_contact_update_requires_status() {
        let uri = format!("/api/v1/contacts/{}", uuid::Uuid::new_v4());
        let (status, body) = send(json_request(Method::PUT, &uri, "{}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["status"], json!("Status is required"));
    }

    #[tokio::test]
    async fn test_empty_bulk_settings_request() {
        let (status, body) =
            send(json_request(Method::POST, "/api/v1/settings/bulk", "[]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], json!("At least one key is required"));
    }

    #[tokio::test]
    async fn test_attach_without_media_id_is_validation_error() {
        let uri = format!("/api/v1/posts/{}/media", uuid::Uuid::new_v4());
        let (status, body) =
            send(json_request(Method::POST, &uri, r#"{"media_role":"gallery"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["media_id"], json!("Media ID is required"));
    }
}

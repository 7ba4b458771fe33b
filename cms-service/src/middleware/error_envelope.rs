//! Error envelopes for responses produced by tower layers rather than handlers
//!
//! The timeout, body-limit and panic layers answer on their own with empty or
//! plain-text bodies. These hooks rewrite those answers into the same
//! `{success: false, error: {..}}` shape handlers use.

use std::any::Any;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::handlers::ApiError;

/// Rewrite layer-generated 408 and 413 responses into the error envelope
///
/// Responses that already carry JSON are left alone, so a 413 raised by a
/// body extractor keeps its own envelope.
pub async fn envelope_layer_errors(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::REQUEST_TIMEOUT => ApiError::request_timeout().into_response(),
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large().into_response(),
        _ => response,
    }
}

/// Panic handler for `CatchPanicLayer`; the panic message is logged, never returned
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}

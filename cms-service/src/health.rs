//! Health check handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::handlers::ItemResponse;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    pub version: String,
}

/// Liveness probe
///
/// Answers 200 whenever the process is serving; it does not touch the database.
pub async fn health(State(state): State<AppState>) -> ItemResponse<HealthResponse> {
    ItemResponse(HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
